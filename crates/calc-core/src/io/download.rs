//! Streaming download of a release binary into an already-open file.

use std::time::Duration;

use futures::StreamExt;
use reqwest::Client;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::Reporter;

/// Failure while fetching a binary.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Transport failure or timeout.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with something other than `200 OK`.
    #[error("HTTP {0}")]
    Status(u16),

    /// Writing the body to disk failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What the server sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Body length actually written.
    pub bytes_written: u64,
    /// Raw `Content-Type` header, if any.
    pub content_type: Option<String>,
}

/// GET `url` and stream the body into `dest`, bounded by `timeout`.
///
/// Anything but `200 OK` is an error. The file is flushed but not closed.
///
/// # Errors
///
/// Returns [`DownloadError`] on transport failure, timeout, a non-200 status,
/// or a failed write.
pub async fn download_to<R: Reporter + ?Sized>(
    client: &Client,
    url: &str,
    dest: &mut File,
    timeout: Duration,
    reporter: &R,
) -> Result<Download, DownloadError> {
    let response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
        .timeout(timeout)
        .send()
        .await?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(DownloadError::Status(status.as_u16()));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let total_size = response.content_length();

    reporter.downloading(0, total_size);

    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        dest.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
        reporter.downloading(downloaded, total_size);
    }
    dest.flush().await?;

    tracing::debug!(url, bytes = downloaded, ?content_type, "download finished");

    Ok(Download {
        bytes_written: downloaded,
        content_type,
    })
}
