//! slackdl-rs — Rust rewrite of a Slack workspace file downloader.
//!
//! Walks the `files.list` Web API page by page, mirrors every shared file
//! into `<directory>/<channel or group>/`, and persists a timestamp
//! checkpoint so the next run only lists what arrived since. Content is
//! streamed to disk with exponential-backoff retries on transient failures.

#![warn(clippy::all)]

mod checkpoint;
mod cli;
mod config;
mod download;
mod retry;
mod shutdown;
mod slack;

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    let filter = match cli.log_level {
        cli::LogLevel::Trace => "trace",
        cli::LogLevel::Debug => "debug",
        cli::LogLevel::Info => "info",
        cli::LogLevel::Warn => "warn",
        cli::LogLevel::Error => "error",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    let config = config::Config::from_cli(cli)?;
    tracing::info!(
        concurrency = config.concurrent_downloads,
        directory = %config.directory.display(),
        checkpoint = %config.checkpoint_file.display(),
        "Starting slackdl-rs"
    );

    let client = slack::SlackClient::new(
        &config.token,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let resolver = slack::NameResolver::new(client.clone());
    let store = checkpoint::CheckpointStore::new(config.checkpoint_file.clone());
    let shutdown_token = shutdown::install_signal_handler();

    let sync_config = download::SyncConfig {
        directory: config.directory.clone(),
        concurrent_downloads: config.concurrent_downloads as usize,
        retry: config.retry,
        dry_run: config.dry_run,
        no_progress_bar: config.no_progress_bar,
    };

    let run = download::run_sync(&client, &resolver, &store, &sync_config, shutdown_token);
    match config.run_timeout_secs {
        Some(secs) => {
            tokio::time::timeout(Duration::from_secs(secs), run)
                .await
                .map_err(|_| anyhow::anyhow!("Run timed out after {secs}s"))??;
        }
        None => {
            run.await?;
        }
    }

    tracing::info!("Finished.");
    Ok(())
}
