//! ciwatch-core - CircleCI build watching for GitLab pipelines
//!
//! Provides a build watcher that:
//! - Locates the CircleCI build for a given commit SHA on a branch
//! - Polls that build's status until it is terminal
//! - Shares one iteration budget across both phases so total runtime
//!   stays under the invoking pipeline's timeout

pub mod api;
pub mod config;
pub mod error;
pub mod fakes;
pub mod status;
pub mod telemetry;
pub mod watcher;

// Re-export key types
pub use api::{BuildApi, BuildDetail, BuildSummary, CircleCiClient};
pub use config::WatchConfig;
pub use error::{WatchError, WatchResult};
pub use status::StatusClass;
pub use telemetry::init_tracing;
pub use watcher::{BuildWatcher, WatchOutcome, WatchState};
