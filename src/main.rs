//! nodescout - Remote node catalog engine
//!
//! Entry point: warms the catalog cache against the configured repository
//! and prints the resulting cache statistics as JSON.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use nodescout::observability::init_tracing;
use nodescout::remote::GithubClient;
use nodescout::{Catalog, Config};

/// nodescout - Remote node catalog engine
#[derive(Parser, Debug)]
#[command(name = "nodescout")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Repository owner (user or organization)
    #[arg(long, env = "NODESCOUT_OWNER", default_value = "n8n-io")]
    owner: String,

    /// Repository name
    #[arg(long, env = "NODESCOUT_REPO", default_value = "n8n")]
    repo: String,

    /// Branch reference to read from
    #[arg(short, long, env = "NODESCOUT_BRANCH", default_value = "master")]
    branch: String,

    /// API token for authenticated access (higher rate limits)
    #[arg(long, env = "GITHUB_TOKEN")]
    token: Option<String>,

    /// Blob fetches issued concurrently per batch
    #[arg(long, env = "NODESCOUT_BATCH_SIZE", default_value = "10")]
    batch_size: usize,

    /// Delay between batches, in milliseconds
    #[arg(long, env = "NODESCOUT_BATCH_DELAY_MS", default_value = "300")]
    batch_delay_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "NODESCOUT_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, env = "NODESCOUT_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.log_json);

    tracing::info!("nodescout v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config {
        owner: cli.owner,
        repo: cli.repo,
        branch: cli.branch,
        token: cli.token,
        batch_size: cli.batch_size,
        batch_delay: Duration::from_millis(cli.batch_delay_ms),
        ..Config::default()
    };
    config.validate().context("invalid configuration")?;

    tracing::debug!(?config, "Configuration loaded");

    let client = GithubClient::new(&config).context("building API client")?;
    let catalog = Catalog::new(Arc::new(client), config);

    catalog
        .ensure_initialized()
        .await
        .context("catalog discovery failed")?;

    let stats = catalog.stats().await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);

    Ok(())
}
