//! Backend seam for the monitoring REST API.
//!
//! The transport is a collaborator, not part of the engine: everything
//! downstream consumes whatever the `Backend` trait hands over. A stub
//! implementation keeps the binary runnable without a live server.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Map};

use crate::state::{Config, Snapshot};

pub mod rest;
pub mod retry;

/// One watch-list entry as the account endpoint returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountRecord {
    pub id: u64,
    pub twitter_id: u64,
    pub screen_name: String,
}

#[async_trait]
pub trait Backend {
    /// All accounts on the logged-in user's watch-list.
    async fn fetch_accounts(&self) -> Result<Vec<AccountRecord>>;

    /// Full ordered snapshot list for one account.
    async fn fetch_snapshot_list(&self, account_id: u64) -> Result<Vec<Snapshot>>;

    /// Full record for one snapshot.
    async fn fetch_snapshot_detail(&self, snapshot_id: u64) -> Result<Snapshot>;

    /// One-off scoring of an arbitrary screen name, outside the watch-list.
    async fn check_account(&self, screen_name: &str) -> Result<Snapshot>;
}

#[derive(Clone, Copy, Debug)]
pub enum BackendKind {
    Rest,
    Stub,
}

impl BackendKind {
    pub fn from_env() -> Self {
        match std::env::var("BACKEND").unwrap_or_else(|_| "rest".to_string()).as_str() {
            "stub" => BackendKind::Stub,
            _ => BackendKind::Rest,
        }
    }

    pub fn build(self, cfg: &Config) -> Result<Box<dyn Backend + Send + Sync>> {
        match self {
            BackendKind::Rest => Ok(Box::new(rest::RestBackend::new(cfg)?)),
            BackendKind::Stub => Ok(Box::new(StubBackend)),
        }
    }
}

/// Canned data for offline runs: two accounts, snapshots every other day
/// over the past week.
pub struct StubBackend;

impl StubBackend {
    fn canned_snapshot(account_id: u64, snapshot_id: u64, days_ago: i64, score: f64) -> Snapshot {
        let mut features = Map::new();
        features.insert("followers_count".to_string(), json!(240.0 + account_id as f64));
        features.insert("friends_count".to_string(), json!(180.0));
        features.insert("statuses_count".to_string(), json!(5120.0));
        features.insert("favourites_count".to_string(), json!(330.0));
        features.insert("listed_count".to_string(), json!(4.0));
        Snapshot {
            id: snapshot_id,
            account_id,
            screen_name: format!("watched_{}", account_id),
            name: format!("Watched {}", account_id),
            taken_at: Utc::now() - Duration::days(days_ago),
            score,
            features,
        }
    }

    fn canned_list(account_id: u64) -> Vec<Snapshot> {
        (0..3i64)
            .map(|i| {
                let days_ago = (2 - i) * 2; // oldest first
                let score = 0.2 + account_id as f64 * 0.1 + i as f64 * 0.05;
                Self::canned_snapshot(account_id, account_id * 100 + i as u64, days_ago, score)
            })
            .collect()
    }
}

#[async_trait]
impl Backend for StubBackend {
    async fn fetch_accounts(&self) -> Result<Vec<AccountRecord>> {
        Ok(vec![
            AccountRecord { id: 1, twitter_id: 11111, screen_name: "watched_1".to_string() },
            AccountRecord { id: 2, twitter_id: 22222, screen_name: "watched_2".to_string() },
        ])
    }

    async fn fetch_snapshot_list(&self, account_id: u64) -> Result<Vec<Snapshot>> {
        Ok(Self::canned_list(account_id))
    }

    async fn fetch_snapshot_detail(&self, snapshot_id: u64) -> Result<Snapshot> {
        let account_id = snapshot_id / 100;
        Self::canned_list(account_id)
            .into_iter()
            .find(|s| s.id == snapshot_id)
            .ok_or_else(|| anyhow::anyhow!("snapshot {} not found", snapshot_id))
    }

    async fn check_account(&self, screen_name: &str) -> Result<Snapshot> {
        let mut snapshot = Self::canned_snapshot(0, 0, 0, 0.42);
        snapshot.screen_name = screen_name.to_string();
        snapshot.name = screen_name.to_string();
        Ok(snapshot)
    }
}
