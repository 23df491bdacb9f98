use crate::keys::validate_key;
use crate::traits::{check_quota, KeyValueStore, StorageError, StorageResult};
use crate::StoreBackend;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

const VALUE_EXTENSION: &str = "json";

/// Local filesystem store: one `{key}.json` file per key under `base_path`.
///
/// Writes go to a sibling temp file that is then renamed over the target, so a crash
/// mid-write leaves the previous value in place.
#[derive(Clone)]
pub struct LocalStore {
    base_path: PathBuf,
    quota_bytes: Option<u64>,
    write_lock: Arc<Mutex<()>>,
}

impl LocalStore {
    /// Create a new LocalStore instance
    ///
    /// # Arguments
    /// * `base_path` - Directory holding the value files (created if missing)
    /// * `quota_bytes` - Total capacity across all keys; `None` for unlimited
    pub async fn new(base_path: impl Into<PathBuf>, quota_bytes: Option<u64>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::Config(format!(
                "Failed to create store directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStore {
            base_path,
            quota_bytes,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert a key to its value file, rejecting keys that could escape `base_path`.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.base_path.join(format!("{}.{}", key, VALUE_EXTENSION)))
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    async fn file_len(path: &Path) -> StorageResult<u64> {
        match fs::metadata(path).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    /// Value files in the store as (key, size) pairs.
    async fn entries(&self) -> StorageResult<Vec<(String, u64)>> {
        let mut entries = Vec::new();
        let mut dir = fs::read_dir(&self.base_path).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(VALUE_EXTENSION) {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let len = entry.metadata().await?.len();
            entries.push((key.to_string(), len));
        }
        Ok(entries)
    }
}

#[async_trait]
impl KeyValueStore for LocalStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.key_to_path(key)?;

        match fs::read_to_string(&path).await {
            Ok(value) => {
                tracing::debug!(
                    path = %path.display(),
                    key = %key,
                    size_bytes = value.len(),
                    "Local store read"
                );
                Ok(Some(value))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Backend(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn set(&self, key: &str, value: String) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        let size = value.len() as u64;
        let _guard = self.write_lock.lock().await;

        if self.quota_bytes.is_some() {
            let current_total = self.used_bytes().await?;
            let replaced = Self::file_len(&path).await?;
            check_quota(self.quota_bytes, current_total, replaced, size)?;
        }

        let start = std::time::Instant::now();
        let temp = Self::temp_path(&path);

        let mut file = fs::File::create(&temp).await.map_err(|e| {
            StorageError::Backend(format!("Failed to create file {}: {}", temp.display(), e))
        })?;
        file.write_all(value.as_bytes()).await.map_err(|e| {
            StorageError::Backend(format!("Failed to write file {}: {}", temp.display(), e))
        })?;
        file.sync_all().await.map_err(|e| {
            StorageError::Backend(format!("Failed to sync file {}: {}", temp.display(), e))
        })?;
        drop(file);

        if let Err(e) = fs::rename(&temp, &path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StorageError::Backend(format!(
                "Failed to replace {}: {}",
                path.display(),
                e
            )));
        }

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local store write successful"
        );

        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        let _guard = self.write_lock.lock().await;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(key = %key, "Local store entry removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Backend(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn keys(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .entries()
            .await?
            .into_iter()
            .map(|(key, _)| key)
            .filter(|key| key.starts_with(prefix))
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn used_bytes(&self) -> StorageResult<u64> {
        Ok(self.entries().await?.iter().map(|(_, len)| len).sum())
    }

    fn backend_type(&self) -> StoreBackend {
        StoreBackend::Local
    }
}
