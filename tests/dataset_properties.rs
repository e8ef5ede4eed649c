//! Properties of the axis/alignment/composition pipeline, exercised
//! through the public API over swept date ranges.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use serde_json::Map;

use botwatch::axis::{build_axis, day_label, DateWindow};
use botwatch::chart::{ChartSession, PointerEvent, TextSurface};
use botwatch::dataset::{compute_dataset, PALETTE};
use botwatch::nav::SnapshotNavigator;
use botwatch::state::{Account, Snapshot};

fn at_day(day: NaiveDate, hour: u32) -> chrono::DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_hms_opt(hour, 0, 0).unwrap())
}

fn snapshot(id: u64, account_id: u64, day: NaiveDate, score: f64) -> Snapshot {
    let mut features = Map::new();
    features.insert("followers_count".to_string(), serde_json::json!(100.0));
    Snapshot {
        id,
        account_id,
        screen_name: format!("user{}", account_id),
        name: format!("User {}", account_id),
        taken_at: at_day(day, 14),
        score,
        features,
    }
}

fn account(id: u64, snapshots: Vec<Snapshot>) -> Account {
    let mut account = Account::new(id, format!("user{}", id));
    account.snapshots = snapshots;
    account
}

// ---------------------------------------------------------------------------
// Axis properties
// ---------------------------------------------------------------------------

#[test]
fn axis_length_is_inclusive_day_count_for_swept_ranges() {
    let base = NaiveDate::from_ymd_opt(2023, 11, 20).unwrap();
    for start_off in 0..8 {
        for span in 0..45 {
            let start = base + Duration::days(start_off);
            let end = start + Duration::days(span);
            let axis = build_axis(&DateWindow::new(at_day(start, 3), at_day(end, 21))).unwrap();
            assert_eq!(axis.len() as i64, span + 1, "span {} from {}", span, start);
            for pair in axis.days().windows(2) {
                assert_eq!(pair[1] - pair[0], Duration::days(1));
            }
        }
    }
}

#[test]
fn axis_labels_are_fixed_format() {
    let start = NaiveDate::from_ymd_opt(2024, 12, 28).unwrap();
    let end = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
    let axis = build_axis(&DateWindow::new(at_day(start, 0), at_day(end, 0))).unwrap();
    assert_eq!(
        axis.labels(),
        vec!["28-12-24", "29-12-24", "30-12-24", "31-12-24", "01-01-25", "02-01-25"]
    );
    for (day, label) in axis.days().iter().zip(axis.labels()) {
        assert_eq!(label, day_label(*day));
    }
}

// ---------------------------------------------------------------------------
// Composition properties
// ---------------------------------------------------------------------------

#[test]
fn composed_series_always_match_axis_length_and_are_never_all_absent() {
    let base = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    // Accounts with snapshots scattered at varying strides.
    let accounts: Vec<Account> = (1..=4)
        .map(|id| {
            let snaps = (0..10)
                .filter(|i| i % id == 0)
                .map(|i| snapshot(id * 1000 + i, id, base + Duration::days(i as i64), 0.5))
                .collect();
            account(id, snaps)
        })
        .collect();

    for span in 0..12 {
        let window = DateWindow::new(at_day(base, 1), at_day(base + Duration::days(span), 23));
        let axis = build_axis(&window).unwrap();
        let dataset = compute_dataset(&accounts, &window);
        for series in &dataset.series {
            assert_eq!(series.series.len(), axis.len());
            assert!(
                series.series.iter().any(|slot| slot.is_some()),
                "all-absent series retained for span {}",
                span
            );
        }
    }
}

#[test]
fn palette_is_unique_then_cyclic() {
    let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let n = PALETTE.len() as u64 + 3;
    let accounts: Vec<Account> = (1..=n)
        .map(|id| account(id, vec![snapshot(id, id, day, 0.5)]))
        .collect();
    let window = DateWindow::new(at_day(day, 0), at_day(day, 0));
    let dataset = compute_dataset(&accounts, &window);
    assert_eq!(dataset.series.len() as u64, n);

    let first_cycle: Vec<&str> = dataset.series[..PALETTE.len()]
        .iter()
        .map(|s| s.color.as_str())
        .collect();
    let mut unique = first_cycle.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), PALETTE.len());

    for (i, series) in dataset.series.iter().enumerate() {
        assert_eq!(series.color, PALETTE[i % PALETTE.len()]);
    }
}

// ---------------------------------------------------------------------------
// End to end: compose, render, click, navigate
// ---------------------------------------------------------------------------

#[test]
fn click_on_rendered_point_round_trips_to_navigation() {
    let d1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let d2 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let d3 = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
    let snaps = vec![
        snapshot(1, 7, d1, 0.2),
        snapshot(2, 7, d2, 0.5),
        snapshot(3, 7, d3, 0.8),
    ];
    let acct = account(7, snaps.clone());
    let window = DateWindow::new(at_day(d1, 0), at_day(d3, 0));
    let axis = build_axis(&window).unwrap();
    let dataset = compute_dataset(std::slice::from_ref(&acct), &window);

    let mut session = ChartSession::new(TextSurface::new(200, 100), 8.0);
    session.render(dataset, &axis).unwrap();

    // Middle snapshot plots at x=100, y=50 on a 200x100 surface.
    let cursor = session.resolve_click(PointerEvent { x: 103.0, y: 48.0 }).unwrap();
    assert_eq!(cursor.account_id, 7);
    assert_eq!(cursor.snapshot_id, 2);

    let mut nav = SnapshotNavigator::new(snaps, Some(cursor.snapshot_id)).unwrap();
    assert_eq!(nav.availability().previous, true);
    assert_eq!(nav.availability().next, true);
    assert_eq!(nav.next().unwrap().id, 3);
    assert_eq!(nav.availability().next, false);
}
