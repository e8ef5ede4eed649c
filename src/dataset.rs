//! Composition of the plot-ready dataset from the account list.

use crate::align::{align_series, is_all_absent, AlignedSeries, TieBreak};
use crate::axis::{build_axis, DateAxis, DateWindow};
use crate::logging::{log, obj, v_num, Domain, Level};
use crate::state::Account;

/// Display colors, assigned in retention order and reused cyclically when
/// more series survive than the palette holds.
pub const PALETTE: &[&str] = &[
    "#e6194b", "#3cb44b", "#4363d8", "#f58231", "#911eb4", "#46f0f0", "#f032e6", "#bcf60c",
    "#008080", "#9a6324",
];

/// One retained account's contribution to the chart.
#[derive(Debug, Clone)]
pub struct PlotSeries {
    /// Screen name recorded on the first present snapshot, not the live
    /// account record; a later upstream rename does not rewrite history.
    pub label: String,
    pub color: String,
    pub series: AlignedSeries,
}

impl PlotSeries {
    /// Y-values for the renderer, absence carried through.
    pub fn scores(&self) -> Vec<Option<f64>> {
        self.series.iter().map(|slot| slot.as_ref().map(|s| s.score)).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlotDataset {
    pub series: Vec<PlotSeries>,
}

impl PlotDataset {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Run the aligner over every selected account and assemble the dataset.
///
/// Accounts iterate in stored order; unselected ones are skipped and
/// all-absent series are dropped before any palette slot is consumed. An
/// account still waiting on its snapshot fetch simply aligns to all-absent
/// and falls out, so partial stores compose fine.
pub fn compose(
    accounts: &[Account],
    axis: &DateAxis,
    window: &DateWindow,
    palette: &[&str],
) -> PlotDataset {
    let (start, end) = match window.bounds() {
        Some(b) => b,
        None => return PlotDataset::default(),
    };
    if palette.is_empty() {
        return PlotDataset::default();
    }

    let mut series_out = Vec::new();
    for account in accounts {
        if !account.is_selected {
            continue;
        }
        let aligned = align_series(&account.snapshots, axis, start, end, TieBreak::FirstOfDay);
        if is_all_absent(&aligned) {
            continue;
        }
        let label = aligned
            .iter()
            .flatten()
            .next()
            .map(|s| s.screen_name.clone())
            .unwrap_or_default();
        let color = palette[series_out.len() % palette.len()].to_string();
        series_out.push(PlotSeries { label, color, series: aligned });
    }

    log(
        Level::Debug,
        Domain::Dataset,
        "dataset_composed",
        obj(&[
            ("accounts", v_num(accounts.len() as f64)),
            ("series", v_num(series_out.len() as f64)),
            ("days", v_num(axis.len() as f64)),
        ]),
    );

    PlotDataset { series: series_out }
}

/// Pure entry point: accounts + window in, plot dataset out. An invalid
/// window or a fully-filtered store yields an empty dataset, never an
/// error; callers render an empty-but-valid chart.
pub fn compute_dataset(accounts: &[Account], window: &DateWindow) -> PlotDataset {
    match build_axis(window) {
        Some(axis) => compose(accounts, &axis, window, PALETTE),
        None => PlotDataset::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::snap;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn window(start: &str, end: &str) -> DateWindow {
        let s = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
        let e = NaiveDate::parse_from_str(end, "%Y-%m-%d").unwrap();
        DateWindow::new(
            Utc.from_utc_datetime(&s.and_hms_opt(10, 0, 0).unwrap()),
            Utc.from_utc_datetime(&e.and_hms_opt(10, 0, 0).unwrap()),
        )
    }

    fn account_with(id: u64, days_scores: &[(&str, f64)]) -> Account {
        let mut account = Account::new(id, format!("user{}", id));
        account.snapshots = days_scores
            .iter()
            .enumerate()
            .map(|(i, (day, score))| snap(id * 100 + i as u64, id, day, *score))
            .collect();
        account
    }

    #[test]
    fn test_invalid_window_composes_empty() {
        let accounts = vec![account_with(1, &[("2024-01-01", 0.2)])];
        let dataset = compute_dataset(&accounts, &DateWindow::default());
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_all_absent_series_are_dropped() {
        // A selected account with no in-range data is excluded.
        let w = window("2024-01-01", "2024-01-03");
        let accounts = vec![
            account_with(1, &[("2024-01-02", 0.3)]),
            account_with(2, &[("2023-12-25", 0.9)]),
        ];
        let dataset = compute_dataset(&accounts, &w);
        assert_eq!(dataset.series.len(), 1);
        assert_eq!(dataset.series[0].label, "user1");
    }

    #[test]
    fn test_unselected_accounts_are_skipped() {
        let w = window("2024-01-01", "2024-01-03");
        let mut hidden = account_with(1, &[("2024-01-02", 0.3)]);
        hidden.is_selected = false;
        let accounts = vec![hidden, account_with(2, &[("2024-01-02", 0.6)])];
        let dataset = compute_dataset(&accounts, &w);
        assert_eq!(dataset.series.len(), 1);
        assert_eq!(dataset.series[0].label, "user2");
    }

    #[test]
    fn test_dropped_series_do_not_consume_palette_slots() {
        // Three selected accounts, middle one has no data in
        // range; survivors take the first two palette colors in order.
        let w = window("2024-01-01", "2024-01-03");
        let accounts = vec![
            account_with(1, &[("2024-01-01", 0.1)]),
            account_with(2, &[]),
            account_with(3, &[("2024-01-03", 0.7)]),
        ];
        let palette = ["red", "green", "blue"];
        let axis = build_axis(&w).unwrap();
        let dataset = compose(&accounts, &axis, &w, &palette);
        assert_eq!(dataset.series.len(), 2);
        assert_eq!(dataset.series[0].label, "user1");
        assert_eq!(dataset.series[0].color, "red");
        assert_eq!(dataset.series[1].label, "user3");
        assert_eq!(dataset.series[1].color, "green");
    }

    #[test]
    fn test_palette_wraps_cyclically() {
        let w = window("2024-01-01", "2024-01-01");
        let accounts: Vec<Account> = (1..=5)
            .map(|id| account_with(id, &[("2024-01-01", 0.5)]))
            .collect();
        let palette = ["red", "green"];
        let axis = build_axis(&w).unwrap();
        let dataset = compose(&accounts, &axis, &w, &palette);
        let colors: Vec<&str> = dataset.series.iter().map(|s| s.color.as_str()).collect();
        assert_eq!(colors, vec!["red", "green", "red", "green", "red"]);
    }

    #[test]
    fn test_colors_unique_up_to_palette_length() {
        let w = window("2024-01-01", "2024-01-01");
        let accounts: Vec<Account> = (1..=PALETTE.len() as u64)
            .map(|id| account_with(id, &[("2024-01-01", 0.5)]))
            .collect();
        let dataset = compute_dataset(&accounts, &w);
        let mut colors: Vec<&String> = dataset.series.iter().map(|s| &s.color).collect();
        colors.sort();
        colors.dedup();
        assert_eq!(colors.len(), PALETTE.len());
    }

    #[test]
    fn test_label_uses_first_present_snapshot_screen_name() {
        let w = window("2024-01-01", "2024-01-03");
        let mut account = account_with(1, &[("2024-01-01", 0.2), ("2024-01-03", 0.8)]);
        // Account renamed upstream after the first snapshot was taken.
        account.snapshots[0].screen_name = "old_handle".to_string();
        account.screen_name = "new_handle".to_string();
        let dataset = compute_dataset(&[account], &w);
        assert_eq!(dataset.series[0].label, "old_handle");
    }

    #[test]
    fn test_scores_carry_absence() {
        let w = window("2024-01-01", "2024-01-03");
        let accounts = vec![account_with(1, &[("2024-01-01", 0.2), ("2024-01-03", 0.8)])];
        let dataset = compute_dataset(&accounts, &w);
        assert_eq!(dataset.series[0].scores(), vec![Some(0.2), None, Some(0.8)]);
    }
}
