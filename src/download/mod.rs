//! Sync engine: one pass over the paginated file listing.
//!
//! Every descriptor in a page is materialized through a bounded worker
//! pool, the newest attempted upload timestamp is folded as workers finish,
//! and once the listing is exhausted that watermark plus one is committed
//! as the next run's starting checkpoint. Per-file problems are logged and
//! counted; only a failure to fetch a listing page aborts the run.

pub mod error;
pub mod file;
pub mod paths;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use futures_util::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::checkpoint::CheckpointStore;
use crate::retry::RetryConfig;
use crate::slack::types::{FileDescriptor, Route};
use crate::slack::{FileListing, NameResolver, SlackClient};
use error::MaterializeError;

/// Subset of application config consumed by the sync engine.
/// Decoupled from CLI parsing so the engine can be tested independently.
#[derive(Debug)]
pub struct SyncConfig {
    pub(crate) directory: PathBuf,
    pub(crate) concurrent_downloads: usize,
    pub(crate) retry: RetryConfig,
    pub(crate) dry_run: bool,
    pub(crate) no_progress_bar: bool,
}

/// How a single descriptor ended up.
#[derive(Debug)]
enum MaterializeOutcome {
    Downloaded(PathBuf),
    WouldDownload(PathBuf),
    Unroutable,
}

/// Counters reported at the end of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncStats {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub pages: usize,
}

/// Materialize one descriptor: route it to a channel or group folder,
/// resolve display names, and stream the content into place.
///
/// The route check runs before any network lookup, so unroutable files cost
/// nothing, and in a dry run the function returns before touching the disk.
async fn materialize(
    client: &SlackClient,
    resolver: &NameResolver,
    descriptor: &FileDescriptor,
    config: &SyncConfig,
) -> Result<MaterializeOutcome, MaterializeError> {
    let route = match descriptor.route() {
        Some(route) => route,
        None => return Ok(MaterializeOutcome::Unroutable),
    };

    let user = resolver.user_name(&descriptor.user).await?;
    let folder = match route {
        Route::Channel(id) => resolver.channel_name(id).await?,
        Route::Group(id) => resolver.group_name(id).await?,
    };

    let url = descriptor
        .url_private_download
        .as_deref()
        .ok_or(MaterializeError::MissingUrl)?;

    let uploaded = paths::local_time(descriptor.timestamp);
    let dir = config.directory.join(paths::clean_filename(&folder));
    let dest = dir.join(paths::local_filename(&uploaded, &descriptor.name, &user));

    if config.dry_run {
        return Ok(MaterializeOutcome::WouldDownload(dest));
    }

    tokio::fs::create_dir_all(&dir).await?;
    debug!(file = %descriptor.id, path = %dest.display(), "downloading");
    file::download_file(client, url, &dest, &config.retry).await?;
    Ok(MaterializeOutcome::Downloaded(dest))
}

/// Progress spinner for the run; the listing never announces a total, so
/// there is no bar to fill. Hidden when `--no-progress-bar` is set or
/// stderr is not a TTY (piped output, cron jobs).
fn create_progress_bar(no_progress_bar: bool) -> ProgressBar {
    if no_progress_bar || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {pos} files {msg}")
            .expect("valid template"),
    );
    pb
}

/// Run one sync pass: read the checkpoint, walk the listing, fan the
/// page's descriptors out to a bounded pool, and commit the new watermark.
///
/// The watermark is folded as a max over every descriptor that was
/// attempted, including ones that failed or had nowhere to be routed;
/// re-listing them next run would only resurface the same problem. A
/// cancelled token stops the loop between pages, committing whatever was
/// drained so far.
pub async fn run_sync(
    client: &SlackClient,
    resolver: &NameResolver,
    store: &CheckpointStore,
    config: &SyncConfig,
    shutdown_token: CancellationToken,
) -> anyhow::Result<SyncStats> {
    let started = Instant::now();

    if !config.dry_run {
        if let Err(e) = tokio::fs::create_dir_all(&config.directory).await {
            warn!(path = %config.directory.display(), "Could not create the output root: {e}");
        }
    }

    let since = store.read();
    match since {
        Some(ts) => info!(checkpoint = ts, "Resuming after the committed checkpoint"),
        None => {
            info!("No usable checkpoint, fetching the full history");
            // Seed the file so the next run starts from a clean read.
            if !config.dry_run {
                if let Err(e) = store.write(0) {
                    warn!("Could not initialize the checkpoint file: {e}");
                }
            }
        }
    }

    let mut listing = FileListing::new(client, since);
    let pb = create_progress_bar(config.no_progress_bar);

    let mut stats = SyncStats::default();
    let mut newest_ts: Option<f64> = None;

    loop {
        if shutdown_token.is_cancelled() {
            pb.suspend(|| info!("Shutdown requested, not fetching further pages"));
            break;
        }

        let page = match listing.next_page().await? {
            Some(page) => page,
            None => break,
        };
        stats.pages += 1;

        let outcomes: Vec<(f64, String, Result<MaterializeOutcome, MaterializeError>)> =
            stream::iter(&page.files)
                .map(|descriptor| async move {
                    let result = materialize(client, resolver, descriptor, config).await;
                    (descriptor.timestamp, descriptor.id.clone(), result)
                })
                .buffer_unordered(config.concurrent_downloads.max(1))
                .collect()
                .await;

        // The collect above is the join barrier: every timestamp folded
        // below belongs to a descriptor whose attempt has finished.
        for (timestamp, id, result) in outcomes {
            newest_ts = Some(newest_ts.map_or(timestamp, |max| max.max(timestamp)));
            match result {
                Ok(MaterializeOutcome::Downloaded(dest)) => {
                    stats.downloaded += 1;
                    let filename = dest
                        .file_name()
                        .and_then(|f| f.to_str())
                        .unwrap_or("")
                        .to_string();
                    pb.set_message(filename);
                }
                Ok(MaterializeOutcome::WouldDownload(dest)) => {
                    stats.downloaded += 1;
                    pb.suspend(|| info!("[DRY RUN] Would download {}", dest.display()));
                }
                Ok(MaterializeOutcome::Unroutable) => {
                    stats.skipped += 1;
                    pb.suspend(|| {
                        info!(file = %id, "Not shared in any channel or group, skipping")
                    });
                }
                Err(e) => {
                    stats.failed += 1;
                    pb.suspend(|| tracing::error!(file = %id, "Could not download: {e}"));
                }
            }
            pb.inc(1);
        }
    }

    pb.finish_and_clear();

    if config.dry_run {
        info!("── Dry Run Summary ──");
        info!(
            "  {} files would be downloaded, {} skipped, {} failed",
            stats.downloaded, stats.skipped, stats.failed
        );
        info!("  destination: {}", config.directory.display());
        return Ok(stats);
    }

    if let Some(max_ts) = newest_ts {
        // Strictly past everything attempted; ts_from is inclusive. The
        // watermark never moves backwards, even if the server handed back
        // files older than the bound it was given.
        let mut next = (max_ts.floor() as u64).saturating_add(1);
        if let Some(since) = since {
            next = next.max(since);
        }
        match store.write(next) {
            Ok(()) => info!(checkpoint = next, "Committed checkpoint"),
            Err(e) => warn!("Could not write the checkpoint: {e}"),
        }
    }

    if stats.pages == 0 {
        info!("No new files to download");
        return Ok(stats);
    }

    info!("── Summary ──");
    info!(
        "  {} downloaded, {} skipped, {} failed, {} pages",
        stats.downloaded, stats.skipped, stats.failed, stats.pages
    );
    info!("  elapsed: {}", format_duration(started.elapsed()));

    Ok(stats)
}

fn format_duration(d: Duration) -> String {
    let total = d.as_secs();
    let (hours, mins, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}h {mins:02}m {secs:02}s")
    } else if mins > 0 {
        format!("{mins}m {secs:02}s")
    } else {
        format!("{secs}s")
    }
}
