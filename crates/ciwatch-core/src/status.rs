//! Build status classification.
//!
//! CircleCI's status vocabulary is open-ended, so classification is by
//! explicit allow-lists: a short list of terminal-failure strings, a short
//! list of terminal-success strings, and everything else treated as
//! "keep waiting". An unrecognized future status never ends the watch.

use serde::{Deserialize, Serialize};

/// Statuses that indicate the build failed.
pub const FAILURE_STATUSES: &[&str] = &["canceled", "infrastructure_fail", "timedout", "failed"];

/// Statuses that indicate the build succeeded.
pub const SUCCESS_STATUSES: &[&str] = &["fixed", "success"];

// Remaining known statuses, all non-terminal: "retried", "not_run",
// "running", "queued", "scheduled", "not_running", "no_tests".

/// Local classification of a reported status string.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusClass {
    /// Terminal: the build passed
    Success,
    /// Terminal: the build failed
    Failure,
    /// Non-terminal: poll again after the configured interval
    Pending,
}

impl StatusClass {
    /// Classify a raw status string. Matching is exact and case-sensitive.
    pub fn classify(status: &str) -> Self {
        if FAILURE_STATUSES.contains(&status) {
            StatusClass::Failure
        } else if SUCCESS_STATUSES.contains(&status) {
            StatusClass::Success
        } else {
            StatusClass::Pending
        }
    }

    /// Whether this class ends the monitoring loop.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StatusClass::Pending)
    }
}
