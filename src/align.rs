//! Alignment of one account's sparse snapshots onto the shared date axis.

use chrono::NaiveDate;

use crate::axis::DateAxis;
use crate::state::Snapshot;

/// What to do when several snapshots land on the same calendar day.
///
/// The collection job runs daily, so collisions are rare; when they happen
/// the first snapshot in stored order wins and the rest are dropped for
/// that day. A lossy but explicit policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    FirstOfDay,
}

/// Parallel to the axis: for index i, the snapshot whose calendar day is
/// axis day i, or `None` for days without data.
pub type AlignedSeries = Vec<Option<Snapshot>>;

/// Align `snapshots` onto `axis`, pre-filtered to the window `[start, end]`
/// in calendar days. Output length always equals the axis length.
pub fn align_series(
    snapshots: &[Snapshot],
    axis: &DateAxis,
    start: NaiveDate,
    end: NaiveDate,
    tie_break: TieBreak,
) -> AlignedSeries {
    // Snapshots strictly before the start day or past the end day never
    // reach the per-day search.
    let in_window: Vec<&Snapshot> = snapshots
        .iter()
        .filter(|s| {
            let day = s.day();
            day >= start && day <= end
        })
        .collect();

    axis.days()
        .iter()
        .map(|day| match tie_break {
            TieBreak::FirstOfDay => in_window
                .iter()
                .find(|s| s.day() == *day)
                .map(|s| (*s).clone()),
        })
        .collect()
}

/// A series with no snapshot in range contributes nothing to the plot.
pub fn is_all_absent(series: &AlignedSeries) -> bool {
    series.iter().all(|slot| slot.is_none())
}
