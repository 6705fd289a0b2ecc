//! Build watcher state machine.
//!
//! Two phases run against the API: discovery (find the build for the
//! commit) and monitoring (poll its status until terminal). One iteration
//! counter is shared across both, so time spent discovering shortens the
//! monitoring allowance; the ceiling bounds total runtime below the
//! invoking pipeline's own timeout.

use tracing::{info, warn};

use crate::api::BuildApi;
use crate::config::WatchConfig;
use crate::error::WatchResult;
use crate::status::StatusClass;

/// States of the watch loop.
///
/// `Searching` and `Polling` are the only states that consume budget;
/// `Found` is a pass-through recording the discovery result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// Scanning recent builds for the target commit
    Searching,
    /// A matching build was discovered
    Found(u64),
    /// Polling the discovered build's status
    Polling(u64),
    /// The build reached a success status
    Succeeded(u64),
    /// The build reached a failure status
    Failed(u64),
    /// The iteration budget ran out before a terminal status
    Exhausted,
}

/// Final result of a watch run.
///
/// Query errors are not represented here; they surface as
/// [`WatchError`](crate::error::WatchError) from [`BuildWatcher::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    /// The build completed successfully
    Success { build_num: u64, build_url: String },
    /// The build reached a terminal failure status
    BuildFailed {
        build_num: u64,
        status: String,
        build_url: String,
    },
    /// Discovery never found a build for the commit
    NotFound,
    /// Budget ran out while the found build was still in progress
    Exhausted { build_num: u64 },
}

impl WatchOutcome {
    /// Whether the watched build passed.
    pub fn is_success(&self) -> bool {
        matches!(self, WatchOutcome::Success { .. })
    }

    /// Process exit code this outcome maps to.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

/// Drives discovery and monitoring against a [`BuildApi`].
pub struct BuildWatcher<A: BuildApi> {
    api: A,
    config: WatchConfig,
}

impl<A: BuildApi> BuildWatcher<A> {
    /// Create a watcher over the given API backend.
    pub fn new(api: A, config: WatchConfig) -> Self {
        BuildWatcher { api, config }
    }

    /// Borrow the underlying API backend.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Scan one page of recent builds for the target commit.
    ///
    /// Returns the first entry whose revision matches, in the order the
    /// API returned them. `None` is not an error, just a signal to retry.
    async fn find_build(&self) -> WatchResult<Option<u64>> {
        let builds = self.api.recent_builds().await?;
        Ok(builds
            .iter()
            .find(|b| b.vcs_revision == self.config.commit)
            .map(|b| b.build_num))
    }

    /// Run the watch loop to a terminal state.
    ///
    /// Suspends only while awaiting an HTTP response or sleeping the
    /// configured interval between attempts. Any query error aborts
    /// immediately, regardless of remaining budget.
    pub async fn run(&self) -> WatchResult<WatchOutcome> {
        let mut count: u32 = 0;
        let mut state = WatchState::Searching;
        let mut found_build: Option<u64> = None;
        let mut last_status = String::new();
        let mut last_url = String::new();

        info!(commit = %self.config.commit, branch = %self.config.branch, "Checking CircleCI builds for commit");

        let outcome = loop {
            state = match state {
                WatchState::Searching => {
                    if count > self.config.max_iterations {
                        WatchState::Exhausted
                    } else {
                        match self.find_build().await? {
                            Some(build_num) => WatchState::Found(build_num),
                            None => {
                                info!(
                                    wait_ms = self.config.poll_interval.as_millis() as u64,
                                    "Build not found yet, waiting before checking again"
                                );
                                tokio::time::sleep(self.config.poll_interval).await;
                                count += 1;
                                WatchState::Searching
                            }
                        }
                    }
                }
                WatchState::Found(build_num) => {
                    info!(build_num, commit = %self.config.commit, "Found build for commit");
                    found_build = Some(build_num);
                    WatchState::Polling(build_num)
                }
                WatchState::Polling(build_num) => {
                    if count > self.config.max_iterations {
                        WatchState::Exhausted
                    } else {
                        let detail = self.api.build_detail(build_num).await?;
                        info!(build_num, status = %detail.status, url = %detail.build_url, "Build status");
                        last_status = detail.status.clone();
                        last_url = detail.build_url;
                        match StatusClass::classify(&detail.status) {
                            StatusClass::Success => WatchState::Succeeded(build_num),
                            StatusClass::Failure => WatchState::Failed(build_num),
                            StatusClass::Pending => {
                                tokio::time::sleep(self.config.poll_interval).await;
                                count += 1;
                                WatchState::Polling(build_num)
                            }
                        }
                    }
                }
                WatchState::Succeeded(build_num) => {
                    info!(build_num, url = %last_url, "The build completed successfully");
                    break WatchOutcome::Success {
                        build_num,
                        build_url: std::mem::take(&mut last_url),
                    };
                }
                WatchState::Failed(build_num) => {
                    warn!(build_num, status = %last_status, url = %last_url, "Build failed, see build URL for details");
                    break WatchOutcome::BuildFailed {
                        build_num,
                        status: std::mem::take(&mut last_status),
                        build_url: std::mem::take(&mut last_url),
                    };
                }
                WatchState::Exhausted => match found_build {
                    Some(build_num) => {
                        warn!(
                            build_num,
                            iterations = count,
                            "Iteration budget exhausted before the build finished"
                        );
                        break WatchOutcome::Exhausted { build_num };
                    }
                    None => {
                        warn!(commit = %self.config.commit, "Unable to locate a build for commit");
                        break WatchOutcome::NotFound;
                    }
                },
            };
        };

        Ok(outcome)
    }
}
