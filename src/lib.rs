//! Client engine for the bot-score monitoring service.
//!
//! Fetches watch-listed accounts and their periodic score snapshots,
//! aligns them onto a calendar-day axis, composes the multi-series plot
//! dataset, drives the chart instance lifecycle, and navigates snapshot
//! history in the detail view.

pub mod align;
pub mod api;
pub mod axis;
pub mod chart;
pub mod dataset;
pub mod logging;
pub mod nav;
pub mod panel;
pub mod state;
