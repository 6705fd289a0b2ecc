//! Integration tests for the watch loop with ScriptedBuildApi.

use std::time::Duration;

use ciwatch_core::fakes::ScriptedBuildApi;
use ciwatch_core::{BuildDetail, BuildSummary, BuildWatcher, WatchConfig, WatchOutcome};

const COMMIT: &str = "0a1b2c3d4e5f";

fn summary(build_num: u64, revision: &str) -> BuildSummary {
    BuildSummary {
        build_num,
        vcs_revision: revision.to_string(),
    }
}

/// Config with a zero poll interval so tests never sleep.
fn config(max_iterations: u32) -> WatchConfig {
    WatchConfig::new("token", "shop", "main", COMMIT)
        .with_poll_interval(Duration::ZERO)
        .with_max_iterations(max_iterations)
}

/// Test: a success-list status ends monitoring on the first poll
#[tokio::test]
async fn test_success_status_terminates_on_first_poll() {
    for status in ["success", "fixed"] {
        let api = ScriptedBuildApi::new();
        api.push_listing(vec![summary(7, COMMIT)]);
        api.push_detail_status(status);

        let watcher = BuildWatcher::new(api, config(10));
        let outcome = watcher.run().await.expect("watch failed");

        assert!(outcome.is_success(), "status {status} should succeed");
        assert_eq!(outcome.exit_code(), 0);
        match outcome {
            WatchOutcome::Success { build_num, .. } => assert_eq!(build_num, 7),
            other => panic!("expected Success, got {other:?}"),
        }
    }
}

/// Test: every failure-list status ends monitoring on the first poll
#[tokio::test]
async fn test_failure_statuses_terminate_on_first_poll() {
    for status in ["canceled", "infrastructure_fail", "timedout", "failed"] {
        let api = ScriptedBuildApi::new();
        api.push_listing(vec![summary(7, COMMIT)]);
        api.push_detail(BuildDetail {
            status: status.to_string(),
            build_url: "https://circleci.example.com/gh/acme/shop/7".to_string(),
        });

        let watcher = BuildWatcher::new(api, config(10));
        let outcome = watcher.run().await.expect("watch failed");

        assert_eq!(outcome.exit_code(), 1, "status {status} should fail");
        match outcome {
            WatchOutcome::BuildFailed {
                build_num,
                status: reported,
                build_url,
            } => {
                assert_eq!(build_num, 7);
                assert_eq!(reported, status);
                assert_eq!(build_url, "https://circleci.example.com/gh/acme/shop/7");
            }
            other => panic!("expected BuildFailed, got {other:?}"),
        }
    }
}

/// Test: unlisted statuses trigger another wait-and-poll cycle
#[tokio::test]
async fn test_non_terminal_status_polls_again() {
    let api = ScriptedBuildApi::new();
    api.push_listing(vec![summary(3, COMMIT)]);
    api.push_detail_status("queued");
    api.push_detail_status("running");
    api.push_detail_status("some_future_status");
    api.push_detail_status("success");

    let watcher = BuildWatcher::new(api, config(10));
    let outcome = watcher.run().await.expect("watch failed");

    assert!(outcome.is_success());
    assert_eq!(watcher.api().detail_calls(), 4);
}

/// Test: discovery exhaustion exits without ever calling the detail endpoint
#[tokio::test]
async fn test_discovery_exhaustion_never_calls_detail() {
    let api = ScriptedBuildApi::new();
    // Only non-matching pages, then empty pages forever.
    api.push_listing(vec![summary(1, "other_commit")]);

    let watcher = BuildWatcher::new(api, config(3));
    let outcome = watcher.run().await.expect("watch failed");

    assert_eq!(outcome, WatchOutcome::NotFound);
    assert_eq!(outcome.exit_code(), 1);
    // One attempt per count value 0..=3, then the ceiling trips.
    assert_eq!(watcher.api().listing_calls(), 4);
    assert_eq!(watcher.api().detail_calls(), 0);
}

/// Test: iterations spent discovering are not replenished for monitoring
#[tokio::test]
async fn test_budget_is_shared_across_phases() {
    let api = ScriptedBuildApi::new();
    api.push_listing(Vec::new());
    api.push_listing(Vec::new());
    api.push_listing(vec![summary(9, COMMIT)]);
    // Build never leaves "running"; the queued record repeats.
    api.push_detail_status("running");

    let watcher = BuildWatcher::new(api, config(3));
    let outcome = watcher.run().await.expect("watch failed");

    assert_eq!(outcome, WatchOutcome::Exhausted { build_num: 9 });
    assert_eq!(outcome.exit_code(), 1);
    // Two discovery misses consumed budget, leaving two monitoring polls
    // (counter at 2 and 3) before the ceiling tripped.
    assert_eq!(watcher.api().listing_calls(), 3);
    assert_eq!(watcher.api().detail_calls(), 2);
}

/// Test: a matching entry ends discovery immediately, no extra listing polls
#[tokio::test]
async fn test_match_ends_discovery_immediately() {
    let api = ScriptedBuildApi::new();
    api.push_listing(vec![summary(5, "older_commit"), summary(4, COMMIT)]);
    // A second page is queued but must never be requested.
    api.push_listing(vec![summary(99, COMMIT)]);
    api.push_detail_status("success");

    let watcher = BuildWatcher::new(api, config(10));
    let outcome = watcher.run().await.expect("watch failed");

    match outcome {
        WatchOutcome::Success { build_num, .. } => assert_eq!(build_num, 4),
        other => panic!("expected Success, got {other:?}"),
    }
    assert_eq!(watcher.api().listing_calls(), 1);
}

/// Test: the first matching entry in listing order wins
#[tokio::test]
async fn test_first_matching_entry_wins() {
    let api = ScriptedBuildApi::new();
    api.push_listing(vec![
        summary(12, "other_commit"),
        summary(11, COMMIT),
        summary(10, COMMIT),
    ]);
    api.push_detail_status("fixed");

    let watcher = BuildWatcher::new(api, config(10));
    let outcome = watcher.run().await.expect("watch failed");

    match outcome {
        WatchOutcome::Success { build_num, .. } => assert_eq!(build_num, 11),
        other => panic!("expected Success, got {other:?}"),
    }
}

/// Test: a query error during discovery aborts regardless of remaining budget
#[tokio::test]
async fn test_listing_error_aborts_immediately() {
    let api = ScriptedBuildApi::new();
    api.push_listing_error();

    let watcher = BuildWatcher::new(api, config(100));
    let result = watcher.run().await;

    assert!(result.is_err());
    assert_eq!(watcher.api().listing_calls(), 1);
    assert_eq!(watcher.api().detail_calls(), 0);
}

/// Test: a query error during monitoring aborts regardless of remaining budget
#[tokio::test]
async fn test_detail_error_aborts_immediately() {
    let api = ScriptedBuildApi::new();
    api.push_listing(vec![summary(2, COMMIT)]);
    api.push_detail_error();

    let watcher = BuildWatcher::new(api, config(100));
    let result = watcher.run().await;

    assert!(result.is_err());
    assert_eq!(watcher.api().detail_calls(), 1);
}
