use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::error::MaterializeError;
use crate::retry::{self, RetryAction, RetryConfig};
use crate::slack::SlackClient;

/// Sibling `.part` path for an in-flight download. The temp file lives in
/// the destination directory so the final rename never crosses filesystems.
fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

/// Stream a file's content to `dest` through a `.part` temp file.
///
/// Each attempt starts from scratch: any stale part file is deleted, the
/// body is streamed chunk by chunk, and only a fully flushed file is
/// renamed into place, so `dest` either holds a complete download or does
/// not exist. Transient failures retry with backoff; when the budget runs
/// out the last error is wrapped in `RetriesExhausted`.
pub(crate) async fn download_file(
    client: &SlackClient,
    url: &str,
    dest: &Path,
    retry_config: &RetryConfig,
) -> Result<(), MaterializeError> {
    let part = part_path(dest);
    let part = &part;

    retry::retry_with_backoff(
        retry_config,
        |e: &MaterializeError| {
            if e.is_retryable() {
                RetryAction::Retry
            } else {
                RetryAction::Abort
            }
        },
        || async move {
            let _ = fs::remove_file(part).await;
            attempt_download(client, url, dest, part).await
        },
    )
    .await
    .map_err(|e| {
        // A retryable error survived the loop, so the budget is spent.
        // Non-retryable errors pass through with their own diagnosis.
        if e.is_retryable() {
            MaterializeError::RetriesExhausted {
                retries: retry_config.max_retries,
                path: dest.display().to_string(),
                last_error: e.to_string(),
            }
        } else {
            e
        }
    })
}

async fn attempt_download(
    client: &SlackClient,
    url: &str,
    dest: &Path,
    part: &Path,
) -> Result<(), MaterializeError> {
    let path_str = dest.display().to_string();
    let response = client
        .get_download(url)
        .send()
        .await
        .map_err(|e| MaterializeError::Http {
            source: e,
            path: path_str.clone(),
        })?;

    if !response.status().is_success() {
        return Err(MaterializeError::HttpStatus {
            status: response.status().as_u16(),
            path: path_str,
        });
    }

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(part)
        .await?;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| MaterializeError::Http {
            source: e,
            path: path_str.clone(),
        })?;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    drop(file);

    fs::rename(part, dest).await?;

    Ok(())
}
