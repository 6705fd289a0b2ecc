//! ciwatch - watch a CircleCI build from a GitLab pipeline
//!
//! Run as a GitLab CI job after pushing a commit that CircleCI also
//! builds. The job finds the CircleCI build for `CI_COMMIT_SHA`, polls
//! it until it finishes, and exits 0 only if the build succeeded, so
//! the GitLab pipeline reflects the CircleCI result.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{error, Level};

use ciwatch_core::{init_tracing, BuildWatcher, CircleCiClient, WatchConfig};

#[derive(Parser)]
#[command(name = "ciwatch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Mirror a CircleCI build's pass/fail result as this process's exit code", long_about = None)]
struct Cli {
    /// CircleCI API token
    #[arg(long, env = "CIRCLE_CI_API_TOKEN", hide_env_values = true)]
    token: String,

    /// Project name (matches between GitLab and CircleCI)
    #[arg(long, env = "CI_PROJECT_NAME")]
    project: String,

    /// Branch the commit was pushed to
    #[arg(long, env = "CI_COMMIT_REF_NAME")]
    branch: String,

    /// Git commit SHA to locate
    #[arg(long, env = "CI_COMMIT_SHA")]
    commit: String,

    /// Max entries per recent-builds query
    #[arg(long, env = "CIRCLE_CI_API_LIMIT", default_value_t = ciwatch_core::config::DEFAULT_LIMIT)]
    limit: u32,

    /// Override the CircleCI API base URL
    #[arg(long, env = "CIRCLE_CI_API_BASE", default_value = ciwatch_core::config::DEFAULT_API_BASE)]
    api_base: String,

    /// Seconds to wait between poll attempts
    #[arg(long, default_value_t = 10)]
    poll_interval_secs: u64,

    /// Iteration ceiling shared by discovery and monitoring
    #[arg(long, default_value_t = ciwatch_core::config::DEFAULT_MAX_ITERATIONS)]
    max_iterations: u32,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    match run(cli).await {
        Ok(exit_code) => ExitCode::from(exit_code),
        Err(err) => {
            error!("There was an error checking the build status from CircleCI: {err:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    let config = WatchConfig::new(&cli.token, &cli.project, &cli.branch, &cli.commit)
        .with_limit(cli.limit)
        .with_api_base(&cli.api_base)
        .with_poll_interval(Duration::from_secs(cli.poll_interval_secs))
        .with_max_iterations(cli.max_iterations);

    let client =
        CircleCiClient::new(config.clone()).context("Failed to create CircleCI client")?;
    let watcher = BuildWatcher::new(client, config);

    let outcome = watcher.run().await?;
    Ok(outcome.exit_code())
}
