//! The score-history panel: one view session over the watch-list.
//!
//! Opening the panel bumps the store epoch, fetches the account list, then
//! fetches every snapshot list concurrently. Each arrival is applied under
//! the epoch it was spawned with and triggers a full recompute; the
//! composer runs fine on whatever subset has data so far. Range edits and
//! selection toggles recompute the same way. Nothing is patched
//! incrementally.

use anyhow::Result;
use futures_util::stream::{FuturesUnordered, StreamExt};

use crate::api::Backend;
use crate::axis::{build_axis, DateAxis, DateWindow};
use crate::chart::{ChartBackend, ChartSession, PointerEvent};
use crate::dataset::{compute_dataset, PlotDataset};
use crate::logging::{log, obj, v_num, v_str, Domain, Level};
use crate::nav::{Availability, SnapshotNavigator};
use crate::state::{Account, Config, NavigationCursor, Snapshot, SnapshotStore};

pub struct Panel<B: ChartBackend> {
    backend: Box<dyn Backend + Send + Sync>,
    store: SnapshotStore,
    window: DateWindow,
    chart: ChartSession<B>,
}

impl<B: ChartBackend> Panel<B> {
    pub fn new(backend: Box<dyn Backend + Send + Sync>, surface: B, cfg: &Config) -> Self {
        Self {
            backend,
            store: SnapshotStore::new(),
            window: DateWindow::last_days(cfg.window_days),
            chart: ChartSession::new(surface, cfg.click_radius),
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn chart(&self) -> &ChartSession<B> {
        &self.chart
    }

    /// Open (or re-open) the panel: fresh epoch, fresh fetches, a render
    /// after the account list lands and after every snapshot arrival.
    pub async fn open(&mut self) -> Result<()> {
        let epoch = self.store.begin_view();
        let records = self.backend.fetch_accounts().await?;
        log(
            Level::Info,
            Domain::Fetch,
            "accounts_fetched",
            obj(&[("count", v_num(records.len() as f64)), ("epoch", v_num(epoch as f64))]),
        );
        let accounts: Vec<Account> =
            records.into_iter().map(|r| Account::new(r.id, r.screen_name)).collect();
        self.store.set_accounts(epoch, accounts);
        recompute(&self.store, &self.window, &mut self.chart)?;

        let backend = self.backend.as_ref();
        let ids: Vec<u64> = self.store.accounts().iter().map(|a| a.id).collect();
        let mut fetches: FuturesUnordered<_> = ids
            .into_iter()
            .map(|id| async move { (id, backend.fetch_snapshot_list(id).await) })
            .collect();

        while let Some((account_id, result)) = fetches.next().await {
            match result {
                Ok(snapshots) => {
                    log(
                        Level::Debug,
                        Domain::Fetch,
                        "snapshots_arrived",
                        obj(&[
                            ("account_id", v_num(account_id as f64)),
                            ("count", v_num(snapshots.len() as f64)),
                        ]),
                    );
                    if self.store.apply_snapshots(epoch, account_id, snapshots) {
                        recompute(&self.store, &self.window, &mut self.chart)?;
                    }
                }
                Err(e) => {
                    // The view keeps its last good state; one failed list
                    // must not take the panel down.
                    log(
                        Level::Error,
                        Domain::Fetch,
                        "snapshot_list_failed",
                        obj(&[
                            ("account_id", v_num(account_id as f64)),
                            ("error", v_str(&e.to_string())),
                        ]),
                    );
                }
            }
        }
        Ok(())
    }

    /// Date-range form edit.
    pub fn set_window(&mut self, window: DateWindow) -> Result<()> {
        self.window = window;
        recompute(&self.store, &self.window, &mut self.chart)
    }

    /// Watch-list checkbox toggle.
    pub fn set_selected(&mut self, account_id: u64, selected: bool) -> Result<()> {
        if self.store.set_selected(account_id, selected) {
            recompute(&self.store, &self.window, &mut self.chart)?;
        }
        Ok(())
    }

    /// A click on the chart surface, resolved to a snapshot identity for
    /// the detail view, or `None` off-data.
    pub fn resolve_click(&self, event: PointerEvent) -> Option<NavigationCursor> {
        self.chart.resolve_click(event)
    }

    /// Hand-off to the detail view for one account, positioned on
    /// `snapshot_id` or on the most recent snapshot.
    pub async fn open_detail(
        &self,
        account_id: u64,
        snapshot_id: Option<u64>,
    ) -> Result<DetailView<'_>> {
        DetailView::open(self.backend.as_ref(), account_id, snapshot_id).await
    }
}

fn recompute<B: ChartBackend>(
    store: &SnapshotStore,
    window: &DateWindow,
    chart: &mut ChartSession<B>,
) -> Result<()> {
    match build_axis(window) {
        Some(axis) => {
            let dataset = compute_dataset(store.accounts(), window);
            chart.render(dataset, &axis)
        }
        // Invalid window: an empty-but-valid chart, not an error.
        None => chart.render(PlotDataset::default(), &DateAxis::empty()),
    }
}

/// The account detail view: full snapshot record plus stable
/// previous/next traversal over the stored list.
pub struct DetailView<'a> {
    backend: &'a (dyn Backend + Send + Sync),
    navigator: SnapshotNavigator,
    detailed: Snapshot,
}

impl<'a> DetailView<'a> {
    async fn open(
        backend: &'a (dyn Backend + Send + Sync),
        account_id: u64,
        snapshot_id: Option<u64>,
    ) -> Result<Self> {
        let snapshots = backend.fetch_snapshot_list(account_id).await?;
        let navigator = SnapshotNavigator::new(snapshots, snapshot_id)
            .ok_or_else(|| anyhow::anyhow!("account {} has no snapshot to show", account_id))?;
        let detailed = backend.fetch_snapshot_detail(navigator.cursor().snapshot_id).await?;
        Ok(Self { backend, navigator, detailed })
    }

    pub fn current(&self) -> &Snapshot {
        &self.detailed
    }

    pub fn cursor(&self) -> NavigationCursor {
        self.navigator.cursor()
    }

    pub fn availability(&self) -> Availability {
        self.navigator.availability()
    }

    pub async fn next(&mut self) -> Result<Option<&Snapshot>> {
        let id = match self.navigator.next() {
            Some(s) => s.id,
            None => return Ok(None),
        };
        self.detailed = self.backend.fetch_snapshot_detail(id).await?;
        Ok(Some(&self.detailed))
    }

    pub async fn previous(&mut self) -> Result<Option<&Snapshot>> {
        let id = match self.navigator.previous() {
            Some(s) => s.id,
            None => return Ok(None),
        };
        self.detailed = self.backend.fetch_snapshot_detail(id).await?;
        Ok(Some(&self.detailed))
    }
}
