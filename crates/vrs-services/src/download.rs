//! Saving batch images to the local machine.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use vrs_core::validation::{extension_for_mime, sanitize_filename};
use vrs_core::{ImageData, ImageRecord, IntakeError, UploadBatch};

const HOSTED_MEDIA_DOMAIN: &str = "cloudinary.com";

/// Pause between files when saving a whole batch.
pub const DEFAULT_DOWNLOAD_DELAY: Duration = Duration::from_millis(800);

/// Destination for downloaded image bytes.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Save `bytes` under `filename` and return where they ended up.
    async fn save(&self, bytes: Bytes, filename: &str) -> Result<PathBuf, IntakeError>;
}

/// Writes downloads into a directory, never overwriting an existing file.
#[derive(Debug, Clone)]
pub struct FsDownloader {
    dir: PathBuf,
}

impl FsDownloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `name.jpg`, then `name (1).jpg`, `name (2).jpg`, ...
    async fn free_path(&self, filename: &str) -> std::io::Result<PathBuf> {
        let candidate = self.dir.join(filename);
        if !tokio::fs::try_exists(&candidate).await? {
            return Ok(candidate);
        }

        let path = Path::new(filename);
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("file");
        let extension = path.extension().and_then(|e| e.to_str());
        let mut n = 1;
        loop {
            let name = match extension {
                Some(ext) => format!("{} ({}).{}", stem, n, ext),
                None => format!("{} ({})", stem, n),
            };
            let candidate = self.dir.join(name);
            if !tokio::fs::try_exists(&candidate).await? {
                return Ok(candidate);
            }
            n += 1;
        }
    }
}

#[async_trait]
impl Downloader for FsDownloader {
    async fn save(&self, bytes: Bytes, filename: &str) -> Result<PathBuf, IntakeError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.free_path(&sanitize_filename(filename)).await?;
        tokio::fs::write(&path, &bytes).await?;

        tracing::info!(
            path = %path.display(),
            size_bytes = bytes.len(),
            "Saved image"
        );
        Ok(path)
    }
}

/// Force attachment disposition on hosted-media URLs; other URLs are returned as-is.
pub fn attachment_url(url: &str) -> String {
    if url.contains(HOSTED_MEDIA_DOMAIN) && !url.contains("/upload/fl_attachment/") {
        url.replacen("/upload/", "/upload/fl_attachment/", 1)
    } else {
        url.to_string()
    }
}

/// Name for a downloaded image: its original name, else one derived from the chassis id.
///
/// `position` is the 1-based index within the batch when saving a whole batch.
pub fn download_filename(chassis_id: &str, image: &ImageRecord, position: Option<usize>) -> String {
    if let Some(name) = image.name.as_deref().filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    let extension = extension_for_mime(&image.content_type);
    match position {
        Some(n) => format!("chassis-{}-image-{}.{}", chassis_id, n, extension),
        None => format!("chassis-{}-image.{}", chassis_id, extension),
    }
}

/// Fetches image bytes from wherever a record points and hands them to a [`Downloader`].
#[derive(Clone)]
pub struct BatchDownloader {
    client: Client,
    downloader: Arc<dyn Downloader>,
    delay: Duration,
}

impl BatchDownloader {
    pub fn new(downloader: Arc<dyn Downloader>, timeout: Duration, delay: Duration) -> Result<Self, IntakeError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IntakeError::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            downloader,
            delay,
        })
    }

    async fn fetch(&self, image: &ImageRecord) -> Result<Bytes, IntakeError> {
        match &image.data {
            ImageData::Inline(_) => image
                .data
                .decode_inline()
                .map(Bytes::from)
                .ok_or_else(|| IntakeError::Internal("Stored image data is not valid base64".to_string())),
            ImageData::Remote(url) => {
                let url = attachment_url(url);
                let response = self
                    .client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| IntakeError::Internal(format!("Failed to download {}: {}", url, e)))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(IntakeError::Internal(format!(
                        "Download failed with status {}: {}",
                        status, url
                    )));
                }

                response
                    .bytes()
                    .await
                    .map_err(|e| IntakeError::Internal(format!("Failed to read {}: {}", url, e)))
            }
        }
    }

    /// Save one image from a batch.
    pub async fn download_image(&self, batch: &UploadBatch, index: usize) -> Result<PathBuf, IntakeError> {
        let image = batch.images.get(index).ok_or_else(|| {
            IntakeError::NotFound(format!(
                "Image {} not found in batch {}",
                index + 1,
                batch.chassis_id
            ))
        })?;
        let bytes = self.fetch(image).await?;
        self.downloader
            .save(bytes, &download_filename(&batch.chassis_id, image, None))
            .await
    }

    /// Save every image in batch order, one at a time, pausing between files.
    #[tracing::instrument(skip(self, batch), fields(chassis_id = %batch.chassis_id, files = batch.images.len()))]
    pub async fn download_batch(&self, batch: &UploadBatch) -> Result<Vec<PathBuf>, IntakeError> {
        let mut saved = Vec::with_capacity(batch.images.len());

        for (i, image) in batch.images.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let bytes = self.fetch(image).await?;
            let filename = download_filename(&batch.chassis_id, image, Some(i + 1));
            saved.push(self.downloader.save(bytes, &filename).await?);
        }

        Ok(saved)
    }
}
