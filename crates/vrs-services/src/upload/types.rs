use bytes::Bytes;
use std::path::{Path, PathBuf};
use vrs_core::validation::mime_for_path;

/// Where a pending file's bytes come from.
#[derive(Debug, Clone)]
pub enum FileSource {
    Path(PathBuf),
    Bytes(Bytes),
}

/// A file selected (or captured) for upload but not yet sent anywhere.
#[derive(Debug, Clone)]
pub struct PendingFile {
    pub name: String,
    pub content_type: String,
    pub size: u64,
    pub source: FileSource,
}

impl PendingFile {
    /// Describe a file on disk. The content type is guessed from its extension.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image.jpg")
            .to_string();

        Ok(Self {
            name,
            content_type: mime_for_path(path).to_string(),
            size: metadata.len(),
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    pub fn from_bytes(name: impl Into<String>, content_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            content_type: content_type.into(),
            size: bytes.len() as u64,
            source: FileSource::Bytes(bytes),
        }
    }

    /// Read the whole file into memory.
    pub async fn read(&self) -> std::io::Result<Bytes> {
        match &self.source {
            FileSource::Bytes(bytes) => Ok(bytes.clone()),
            FileSource::Path(path) => Ok(Bytes::from(tokio::fs::read(path).await?)),
        }
    }
}

/// One request to record images for a chassis at a station.
#[derive(Debug, Clone)]
pub struct Submission {
    pub chassis_id: String,
    pub station_id: String,
    pub files: Vec<PendingFile>,
}

impl Submission {
    pub fn new(chassis_id: impl Into<String>, station_id: impl Into<String>, files: Vec<PendingFile>) -> Self {
        Self {
            chassis_id: chassis_id.into(),
            station_id: station_id.into(),
            files,
        }
    }
}
