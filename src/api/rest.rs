//! `reqwest` client for the monitoring API.
//!
//! Token auth rides in an `Authorization: Token <tok>` header; endpoints
//! follow the backend's URL scheme (`account/`, `snapshot/{id}/`,
//! `snapshot/{id}/details/`, `snapshot/single/`).

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use super::retry::{is_retryable_http_error, retry_async, RetryConfig};
use super::{AccountRecord, Backend};
use crate::logging::{log, obj, v_num, v_str, Domain, Level};
use crate::state::{Config, Snapshot};

pub struct RestBackend {
    client: Client,
    base: Url,
    auth_token: Option<String>,
    retry: RetryConfig,
}

impl RestBackend {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.http_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base: Url::parse(&cfg.api_base)?,
            auth_token: cfg.auth_token.clone(),
            retry: RetryConfig::with_max_retries(cfg.retry_max),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, name: &str, url: Url) -> Result<T> {
        retry_async(&self.retry, name, || {
            let url = url.clone();
            async move {
                let mut request = self.client.get(url.clone());
                if let Some(token) = &self.auth_token {
                    request = request.header("Authorization", format!("Token {}", token));
                }
                let response = request.send().await?;
                let status = response.status();
                if !status.is_success() {
                    log(
                        Level::Warn,
                        Domain::Fetch,
                        "http_error",
                        obj(&[
                            ("url", v_str(url.as_str())),
                            ("status", v_num(status.as_u16() as f64)),
                            (
                                "retryable",
                                serde_json::Value::Bool(is_retryable_http_error(status.as_u16())),
                            ),
                        ]),
                    );
                    return Err(anyhow!("{} returned {}", url, status));
                }
                Ok(response.json().await?)
            }
        })
        .await
    }
}

#[async_trait]
impl Backend for RestBackend {
    async fn fetch_accounts(&self) -> Result<Vec<AccountRecord>> {
        let url = self.endpoint("account/")?;
        self.get_json("fetch_accounts", url).await
    }

    async fn fetch_snapshot_list(&self, account_id: u64) -> Result<Vec<Snapshot>> {
        let url = self.endpoint(&format!("snapshot/{}/", account_id))?;
        self.get_json("fetch_snapshot_list", url).await
    }

    async fn fetch_snapshot_detail(&self, snapshot_id: u64) -> Result<Snapshot> {
        let url = self.endpoint(&format!("snapshot/{}/details/", snapshot_id))?;
        self.get_json("fetch_snapshot_detail", url).await
    }

    async fn check_account(&self, screen_name: &str) -> Result<Snapshot> {
        let mut url = self.endpoint("snapshot/single/")?;
        url.query_pairs_mut().append_pair("screen_name", screen_name);
        self.get_json("check_account", url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(base: &str) -> Config {
        Config {
            api_base: base.to_string(),
            auth_token: Some("tok".to_string()),
            window_days: 7,
            http_timeout_secs: 5,
            retry_max: 0,
            chart_width: 100,
            chart_height: 100,
            click_radius: 8.0,
        }
    }

    #[test]
    fn test_endpoint_joins_relative_paths() {
        let backend = RestBackend::new(&test_config("http://127.0.0.1:8000/api/")).unwrap();
        assert_eq!(
            backend.endpoint("snapshot/7/").unwrap().as_str(),
            "http://127.0.0.1:8000/api/snapshot/7/"
        );
        assert_eq!(
            backend.endpoint("snapshot/42/details/").unwrap().as_str(),
            "http://127.0.0.1:8000/api/snapshot/42/details/"
        );
    }

    #[test]
    fn test_invalid_base_is_rejected() {
        assert!(RestBackend::new(&test_config("not a url")).is_err());
    }

    #[test]
    fn test_check_account_query_encoding() {
        let backend = RestBackend::new(&test_config("http://127.0.0.1:8000/api/")).unwrap();
        let mut url = backend.endpoint("snapshot/single/").unwrap();
        url.query_pairs_mut().append_pair("screen_name", "some user");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8000/api/snapshot/single/?screen_name=some+user"
        );
    }

    #[test]
    fn test_snapshot_wire_shape_parses() {
        let snapshot: Snapshot = serde_json::from_str(
            r#"{
                "id": 42,
                "account": 7,
                "screen_name": "watched",
                "name": "Watched",
                "date_of_snapshot": "2024-01-03T06:30:00Z",
                "bot_score": 0.8132,
                "features": {"followers_count": 120, "statuses_count": 4300}
            }"#,
        )
        .unwrap();
        assert_eq!(snapshot.id, 42);
        assert_eq!(snapshot.account_id, 7);
        assert_eq!(snapshot.day(), chrono::NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        let keys: Vec<&String> = snapshot.features.keys().collect();
        assert_eq!(keys, vec!["followers_count", "statuses_count"]);
    }
}
