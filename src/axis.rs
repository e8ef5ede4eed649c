//! Calendar-day axis for the score-history chart.
//!
//! The chart only cares about calendar-day identity; time-of-day on the
//! window endpoints is stripped before anything downstream sees them.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::logging::{log, obj, v_str, Domain, Level};

/// The date-range form values, both ends optional until the user fills them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start: Some(start), end: Some(end) }
    }

    /// The panel's initial window: today back through `days` days ago.
    pub fn last_days(days: i64) -> Self {
        let now = Utc::now();
        Self { start: Some(now - Duration::days(days)), end: Some(now) }
    }

    /// Day-normalized endpoints, or `None` when the window is invalid
    /// (either end missing, or start after end). Callers must not run the
    /// alignment pipeline on `None`.
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = self.start?.date_naive();
        let end = self.end?.date_naive();
        if start > end {
            return None;
        }
        Some((start, end))
    }
}

/// Ordered, gap-free sequence of calendar days, both endpoints inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateAxis {
    days: Vec<NaiveDate>,
}

impl DateAxis {
    /// Zero-day axis, used to render the empty-but-valid chart an invalid
    /// window calls for.
    pub fn empty() -> Self {
        Self { days: Vec::new() }
    }

    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Axis labels in the fixed `dd-mm-yy` display format.
    pub fn labels(&self) -> Vec<String> {
        self.days.iter().map(|d| day_label(*d)).collect()
    }
}

/// `dd-mm-yy` label for one calendar date.
pub fn day_label(day: NaiveDate) -> String {
    day.format("%d-%m-%y").to_string()
}

/// Build the axis for a window, one entry per day from start through end
/// inclusive. `None` signals "no axis": invalid windows never reach the
/// aligner or composer.
pub fn build_axis(window: &DateWindow) -> Option<DateAxis> {
    let (start, end) = match window.bounds() {
        Some(b) => b,
        None => {
            log(Level::Debug, Domain::Axis, "invalid_window", obj(&[("msg", v_str("no axis"))]));
            return None;
        }
    };

    let mut days = Vec::new();
    let mut day = start;
    while day <= end {
        days.push(day);
        day = day.succ_opt()?;
    }
    Some(DateAxis { days })
}
