use anyhow::Result;

use botwatch::api::BackendKind;
use botwatch::chart::TextSurface;
use botwatch::logging::{log, obj, v_num, v_str, Domain, Level};
use botwatch::panel::Panel;
use botwatch::state::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("api_base", v_str(&cfg.api_base)),
            ("window_days", v_num(cfg.window_days as f64)),
        ]),
    );

    let backend = BackendKind::from_env().build(&cfg)?;
    let surface = TextSurface::new(cfg.chart_width, cfg.chart_height);
    let mut panel = Panel::new(backend, surface, &cfg);
    panel.open().await?;

    // Walk the newest account history backwards, the way the detail view
    // steps through snapshots.
    let with_data = panel
        .store()
        .accounts()
        .iter()
        .find(|a| !a.snapshots.is_empty())
        .map(|a| a.id);
    if let Some(account_id) = with_data {
        let mut detail = panel.open_detail(account_id, None).await?;
        loop {
            let current = detail.current();
            log(
                Level::Info,
                Domain::Nav,
                "snapshot_detail",
                obj(&[
                    ("screen_name", v_str(&current.screen_name)),
                    ("snapshot_id", v_num(current.id as f64)),
                    ("score", v_num(current.score)),
                ]),
            );
            if detail.previous().await?.is_none() {
                break;
            }
        }
    }

    log(Level::Info, Domain::System, "shutdown", obj(&[]));
    Ok(())
}
