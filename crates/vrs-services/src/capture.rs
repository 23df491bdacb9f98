//! Camera capture as a pluggable source of JPEG bytes.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use vrs_core::IntakeError;

use crate::upload::PendingFile;

pub const CAPTURE_CONTENT_TYPE: &str = "image/jpeg";

/// Source of a single still photo.
#[async_trait]
pub trait ImageCapture: Send + Sync {
    async fn capture(&self) -> Result<Bytes, IntakeError>;
}

/// Wrap captured bytes as a pending file named `camera-photo-<epoch millis>.jpg`.
pub fn captured_file(bytes: Bytes, at: DateTime<Utc>) -> PendingFile {
    PendingFile::from_bytes(
        format!("camera-photo-{}.jpg", at.timestamp_millis()),
        CAPTURE_CONTENT_TYPE,
        bytes,
    )
}

/// Take a photo and wrap it as a pending file.
pub async fn capture_pending(capture: &dyn ImageCapture) -> Result<PendingFile, IntakeError> {
    let bytes = capture.capture().await?;
    if bytes.is_empty() {
        return Err(IntakeError::Internal("Camera returned an empty image".to_string()));
    }
    Ok(captured_file(bytes, Utc::now()))
}

/// Capture that reads a JPEG produced by an external tool, from a file or stdin.
#[derive(Debug, Clone)]
pub enum ReaderCapture {
    File(PathBuf),
    Stdin,
}

#[async_trait]
impl ImageCapture for ReaderCapture {
    async fn capture(&self) -> Result<Bytes, IntakeError> {
        let bytes = match self {
            ReaderCapture::File(path) => tokio::fs::read(path).await?,
            ReaderCapture::Stdin => {
                let mut buf = Vec::new();
                tokio::io::stdin().read_to_end(&mut buf).await?;
                buf
            }
        };
        tracing::debug!(size_bytes = bytes.len(), "Captured photo");
        Ok(Bytes::from(bytes))
    }
}
