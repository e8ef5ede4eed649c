//! Client-side state: configuration, account/snapshot models, and the
//! per-view snapshot store.
//!
//! Entities live only for the current view session. The store is guarded by
//! a view epoch so snapshot lists that resolve after the user has moved on
//! are discarded instead of mutating stale state.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::logging::{log, obj, v_num, Domain, Level};

#[derive(Clone)]
pub struct Config {
    pub api_base: String,
    pub auth_token: Option<String>,
    pub window_days: i64,
    pub http_timeout_secs: u64,
    pub retry_max: u32,
    pub chart_width: u32,
    pub chart_height: u32,
    pub click_radius: f64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_base: std::env::var("API_BASE")
                .unwrap_or_else(|_| "http://127.0.0.1:8000/api/".to_string()),
            auth_token: std::env::var("AUTH_TOKEN").ok(),
            window_days: std::env::var("WINDOW_DAYS").ok().and_then(|v| v.parse().ok()).unwrap_or(7),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(10),
            retry_max: std::env::var("RETRY_MAX").ok().and_then(|v| v.parse().ok()).unwrap_or(3),
            chart_width: std::env::var("CHART_WIDTH").ok().and_then(|v| v.parse().ok()).unwrap_or(640),
            chart_height: std::env::var("CHART_HEIGHT").ok().and_then(|v| v.parse().ok()).unwrap_or(320),
            click_radius: std::env::var("CLICK_RADIUS").ok().and_then(|v| v.parse().ok()).unwrap_or(8.0),
        }
    }
}

/// One timestamped measurement of an account's feature vector and bot score.
///
/// Field names mirror the backend serializer. `features` keeps the backend's
/// insertion order (most-important-first) end to end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: u64,
    #[serde(rename = "account")]
    pub account_id: u64,
    pub screen_name: String,
    pub name: String,
    #[serde(rename = "date_of_snapshot")]
    pub taken_at: DateTime<Utc>,
    #[serde(rename = "bot_score")]
    pub score: f64,
    #[serde(default)]
    pub features: Map<String, Value>,
}

impl Snapshot {
    /// Calendar day the snapshot was taken; the only time identity the
    /// alignment engine ever looks at.
    pub fn day(&self) -> NaiveDate {
        self.taken_at.date_naive()
    }
}

/// A watch-listed account and its snapshots for the current view session.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: u64,
    pub screen_name: String,
    pub is_selected: bool,
    pub snapshots: Vec<Snapshot>,
}

impl Account {
    pub fn new(id: u64, screen_name: String) -> Self {
        Self {
            id,
            screen_name,
            // Everything on the watch-list plots until toggled off.
            is_selected: true,
            snapshots: Vec::new(),
        }
    }
}

/// The currently displayed snapshot identity in the detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationCursor {
    pub account_id: u64,
    pub snapshot_id: u64,
}

/// Per-view holder of accounts and their snapshot lists.
///
/// `begin_view` bumps the epoch and clears everything; writes carry the
/// epoch they were initiated under and are dropped on mismatch.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    epoch: u64,
    accounts: Vec<Account>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Start a fresh view session. Returns the new epoch; every fetch
    /// spawned for this view must carry it.
    pub fn begin_view(&mut self) -> u64 {
        self.epoch += 1;
        self.accounts.clear();
        self.epoch
    }

    /// Install the account list for a view. Stale epochs are refused.
    pub fn set_accounts(&mut self, epoch: u64, accounts: Vec<Account>) -> bool {
        if epoch != self.epoch {
            log(
                Level::Debug,
                Domain::Fetch,
                "stale_accounts_discarded",
                obj(&[("epoch", v_num(epoch as f64)), ("current", v_num(self.epoch as f64))]),
            );
            return false;
        }
        self.accounts = accounts;
        true
    }

    /// Attach a fetched snapshot list to its account. Returns false (and
    /// leaves the store untouched) when the epoch is stale or the account
    /// is no longer present.
    pub fn apply_snapshots(&mut self, epoch: u64, account_id: u64, snapshots: Vec<Snapshot>) -> bool {
        if epoch != self.epoch {
            log(
                Level::Debug,
                Domain::Fetch,
                "stale_snapshots_discarded",
                obj(&[
                    ("account_id", v_num(account_id as f64)),
                    ("epoch", v_num(epoch as f64)),
                    ("current", v_num(self.epoch as f64)),
                ]),
            );
            return false;
        }
        match self.accounts.iter_mut().find(|a| a.id == account_id) {
            Some(account) => {
                account.snapshots = snapshots;
                true
            }
            None => false,
        }
    }

    /// User toggle. The only mutation an account sees after fetch.
    pub fn set_selected(&mut self, account_id: u64, selected: bool) -> bool {
        match self.accounts.iter_mut().find(|a| a.id == account_id) {
            Some(account) => {
                account.is_selected = selected;
                true
            }
            None => false,
        }
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn account(&self, account_id: u64) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == account_id)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    pub fn snap(id: u64, account_id: u64, day: &str, score: f64) -> Snapshot {
        let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap();
        let taken_at = Utc
            .from_utc_datetime(&date.and_hms_opt(12, 30, 0).unwrap());
        let mut features = Map::new();
        features.insert("followers_count".to_string(), json!(120.0));
        features.insert("statuses_count".to_string(), json!(4300.0));
        Snapshot {
            id,
            account_id,
            screen_name: format!("user{}", account_id),
            name: format!("User {}", account_id),
            taken_at,
            score,
            features,
        }
    }
}
