use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::config::LauncherConfig;
use crate::error::{LauncherError, LauncherResult};
use crate::progress::{DownloadProgress, PercentTracker};
use crate::zip_utils;

/// Temporary archive name inside the install directory.
pub const ARCHIVE_FILE_NAME: &str = "update.zip";

pub type ProgressSink<'a> = &'a mut (dyn FnMut(DownloadProgress) + Send);

/// Downloads a build archive and unpacks it over the install directory.
#[async_trait]
pub trait BuildInstaller: Send + Sync {
    async fn download_and_install(
        &self,
        url: &str,
        destination: &Path,
        on_progress: ProgressSink<'_>,
    ) -> LauncherResult<()>;
}

pub struct HttpBuildInstaller {
    client: reqwest::Client,
    header_timeout: Duration,
}

impl HttpBuildInstaller {
    pub fn new(client: reqwest::Client, config: &LauncherConfig) -> Self {
        Self {
            client,
            header_timeout: config.request_timeout,
        }
    }

    /// Stream the body to `archive_path`. Only the wait for response headers is time-bounded.
    async fn download_archive(
        &self,
        url: &str,
        archive_path: &Path,
        on_progress: &mut (dyn FnMut(DownloadProgress) + Send),
    ) -> LauncherResult<u64> {
        let response = tokio::time::timeout(self.header_timeout, self.client.get(url).send())
            .await
            .map_err(|_| LauncherError::Timeout { url: url.to_string() })??;

        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let mut tracker = PercentTracker::new(response.content_length());
        log::info!(
            "Downloading {url} ({} bytes) to {}",
            response
                .content_length()
                .map(|n| n.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            archive_path.to_string_lossy()
        );

        let mut file = tokio::fs::File::create(archive_path)
            .await
            .map_err(|e| LauncherError::io(archive_path, e))?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)
                .await
                .map_err(|e| LauncherError::io(archive_path, e))?;
            if let Some(p) = tracker.advance(chunk.len()) {
                on_progress(p);
            }
        }
        file.flush()
            .await
            .map_err(|e| LauncherError::io(archive_path, e))?;
        drop(file);

        Ok(tracker.read_bytes())
    }
}

#[async_trait]
impl BuildInstaller for HttpBuildInstaller {
    async fn download_and_install(
        &self,
        url: &str,
        destination: &Path,
        on_progress: ProgressSink<'_>,
    ) -> LauncherResult<()> {
        tokio::fs::create_dir_all(destination)
            .await
            .map_err(|e| LauncherError::io(destination, e))?;

        let archive_path = destination.join(ARCHIVE_FILE_NAME);

        let res: LauncherResult<()> = async {
            let bytes = self.download_archive(url, &archive_path, &mut *on_progress).await?;
            log::info!("Downloaded {bytes} bytes, extracting");

            on_progress(DownloadProgress::Indeterminate);
            extract_in_background(archive_path.clone(), destination.to_path_buf()).await
        }
        .await;

        remove_archive(&archive_path).await;

        match &res {
            Ok(()) => log::info!("Build installed into {}", destination.to_string_lossy()),
            Err(e) => log::error!("Update failed: {e}"),
        }
        res
    }
}

async fn extract_in_background(archive_path: PathBuf, destination: PathBuf) -> LauncherResult<()> {
    tokio::task::spawn_blocking(move || {
        zip_utils::extract_zip_overwrite_with_progress(&archive_path, &destination, |done, total, _| {
            if done == total {
                log::info!("Extracted {done}/{total} entries");
            }
        })
    })
    .await?
}

/// Best-effort: a leftover archive is not worth failing the install over.
async fn remove_archive(archive_path: &Path) {
    match tokio::fs::remove_file(archive_path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!(
            "Failed to delete archive {}: {e}",
            archive_path.to_string_lossy()
        ),
    }
}
