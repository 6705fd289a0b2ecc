//! CircleCI API client
//!
//! Two read-only endpoint shapes are consumed:
//! - the recent-builds listing for a branch (discovery)
//! - the single-build detail record (monitoring)
//!
//! The [`BuildApi`] trait is the seam the watcher is written against;
//! the in-memory fake in [`crate::fakes`] implements it for tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::WatchConfig;
use crate::error::{WatchError, WatchResult};

/// One entry from the recent-builds listing.
///
/// The API returns many more fields; only the ones discovery needs are
/// decoded, the rest are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildSummary {
    /// Build number assigned by CircleCI
    pub build_num: u64,
    /// Git SHA the build ran against
    pub vcs_revision: String,
}

/// The build detail record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildDetail {
    /// Current lifecycle status string (open vocabulary)
    pub status: String,
    /// Human-facing URL for the build
    pub build_url: String,
}

/// Read-only access to the build-status API.
#[async_trait]
pub trait BuildApi: Send + Sync {
    /// Fetch one page of recent builds on the configured branch.
    async fn recent_builds(&self) -> WatchResult<Vec<BuildSummary>>;

    /// Fetch the detail record for one build.
    async fn build_detail(&self, build_num: u64) -> WatchResult<BuildDetail>;
}

/// reqwest-backed client for the CircleCI v1.1 API.
pub struct CircleCiClient {
    config: WatchConfig,
    http_client: reqwest::Client,
}

impl CircleCiClient {
    /// Create a new client.
    pub fn new(config: WatchConfig) -> WatchResult<Self> {
        config.validate()?;
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("ciwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(WatchError::from)?;

        Ok(CircleCiClient {
            config,
            http_client,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        endpoint: &'static str,
    ) -> WatchResult<T> {
        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WatchError::Api {
                status: status.as_u16(),
                endpoint,
            });
        }
        debug!(endpoint, status = status.as_u16(), "API response received");
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl BuildApi for CircleCiClient {
    async fn recent_builds(&self) -> WatchResult<Vec<BuildSummary>> {
        self.get_json(&self.config.listing_url(), "recent-builds")
            .await
    }

    async fn build_detail(&self, build_num: u64) -> WatchResult<BuildDetail> {
        self.get_json(&self.config.detail_url(build_num), "build-detail")
            .await
    }
}
