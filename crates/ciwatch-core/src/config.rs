//! Watcher configuration
//!
//! All inputs the watcher needs are carried explicitly in [`WatchConfig`];
//! the library never reads environment variables itself. The CLI layer maps
//! the GitLab-provided variables (`CIRCLE_CI_API_TOKEN`, `CI_COMMIT_SHA`,
//! ...) onto these fields.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{WatchError, WatchResult};

/// Default CircleCI API base for the hautelook GitHub organization.
pub const DEFAULT_API_BASE: &str = "https://circleci.hautelook.net/api/v1.1/project/gh/hautelook";

/// Default page size for the recent-builds listing query.
pub const DEFAULT_LIMIT: u32 = 10;

/// Default pause between poll attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default iteration ceiling shared by discovery and monitoring.
///
/// 354 iterations x 10s = 59 minutes, just under GitLab's 60 minute
/// pipeline timeout.
pub const DEFAULT_MAX_ITERATIONS: u32 = 354;

/// Configuration for a single watch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// CircleCI API token
    pub token: String,
    /// Project name (matches between GitLab and CircleCI)
    pub project: String,
    /// Branch the commit was pushed to
    pub branch: String,
    /// Git commit SHA to locate
    pub commit: String,
    /// Max entries per recent-builds query
    pub limit: u32,
    /// API base URL, up to and excluding the project segment
    pub api_base: String,
    /// Pause between poll attempts
    pub poll_interval: Duration,
    /// Iteration ceiling shared across discovery and monitoring
    pub max_iterations: u32,
}

impl WatchConfig {
    /// Create a config with the default API base, limit, interval, and budget.
    pub fn new(token: &str, project: &str, branch: &str, commit: &str) -> Self {
        WatchConfig {
            token: token.to_string(),
            project: project.to_string(),
            branch: branch.to_string(),
            commit: commit.to_string(),
            limit: DEFAULT_LIMIT,
            api_base: DEFAULT_API_BASE.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Override the listing page size.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Override the API base URL.
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    /// Override the pause between poll attempts.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Override the shared iteration ceiling.
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Reject configs that cannot produce a meaningful request.
    pub fn validate(&self) -> WatchResult<()> {
        if self.token.is_empty() {
            return Err(WatchError::InvalidConfig("API token is empty".to_string()));
        }
        if self.project.is_empty() {
            return Err(WatchError::InvalidConfig(
                "project name is empty".to_string(),
            ));
        }
        if self.branch.is_empty() {
            return Err(WatchError::InvalidConfig(
                "branch name is empty".to_string(),
            ));
        }
        if self.commit.is_empty() {
            return Err(WatchError::InvalidConfig(
                "commit SHA is empty".to_string(),
            ));
        }
        Ok(())
    }

    /// URL of the recent-builds-on-branch listing endpoint.
    pub fn listing_url(&self) -> String {
        format!(
            "{}/{}/tree/{}?circle-token={}&limit={}&shallow=true",
            self.api_base, self.project, self.branch, self.token, self.limit
        )
    }

    /// URL of the build detail endpoint for one build number.
    pub fn detail_url(&self, build_num: u64) -> String {
        format!(
            "{}/{}/{}?circle-token={}",
            self.api_base, self.project, build_num, self.token
        )
    }
}
