//! Writing resolved PDF bodies to disk.
//!
//! The traversal engine hands every [`DownloadJob`](crate::crawl::DownloadJob)
//! to a [`Downloader`] together with the still-unread response body.
//! [`FileDownloader`] streams it to the destination path; [`DryRunDownloader`]
//! only logs what would have been written.

mod error;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};

use crate::crawl::DownloadJob;
use crate::fetch::BodyStream;

pub use error::DownloadError;

/// Consumes a PDF body for a resolved job.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Writes (or discards) `body` for `job`, returning bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] when the body cannot be written.
    async fn download(&self, job: &DownloadJob, body: BodyStream) -> Result<u64, DownloadError>;
}

/// Streams bodies to `job.destination_path`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileDownloader;

impl FileDownloader {
    /// Creates a new file downloader.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Downloader for FileDownloader {
    #[instrument(skip(self, job, body), fields(url = %job.final_url, path = %job.destination_path.display()))]
    async fn download(&self, job: &DownloadJob, body: BodyStream) -> Result<u64, DownloadError> {
        let path = &job.destination_path;
        let file = File::create(path)
            .await
            .map_err(|e| DownloadError::io(path.clone(), e))?;

        let result = stream_to_file(file, body, job).await;
        if result.is_err() {
            debug!("cleaning up partial file after error");
            let _ = tokio::fs::remove_file(path).await;
        }
        let bytes = result?;

        info!(bytes, "download complete");
        Ok(bytes)
    }
}

/// Streams response body to file, returning bytes written.
async fn stream_to_file(
    file: File,
    mut body: BodyStream,
    job: &DownloadJob,
) -> Result<u64, DownloadError> {
    let path = &job.destination_path;
    let mut writer = BufWriter::new(file);
    let mut bytes_written: u64 = 0;

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| DownloadError::stream(path.clone(), e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(path.clone(), e))?;
        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(path.clone(), e))?;

    Ok(bytes_written)
}

/// Writes nothing; used by `--dry-run`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunDownloader;

#[async_trait]
impl Downloader for DryRunDownloader {
    async fn download(&self, job: &DownloadJob, _body: BodyStream) -> Result<u64, DownloadError> {
        info!(
            url = %job.final_url,
            path = %job.destination_path.display(),
            "dry run: would download"
        );
        Ok(0)
    }
}
