//! Per-station batch persistence with age-based retention.

mod retention;
mod search;

pub use retention::prune;
pub use search::{find_by_chassis_id, search};

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use vrs_core::{IntakeConfig, IntakeError, UploadBatch};
use vrs_storage::{read_json, station_key, write_json, KeyValueStore};

/// Owns the persisted batch collection for each station key.
#[derive(Clone)]
pub struct BatchStore {
    store: Arc<dyn KeyValueStore>,
    key_prefix: String,
    retention: Duration,
}

impl BatchStore {
    pub fn new(store: Arc<dyn KeyValueStore>, key_prefix: impl Into<String>, retention: Duration) -> Self {
        Self {
            store,
            key_prefix: key_prefix.into(),
            retention,
        }
    }

    pub fn from_config(store: Arc<dyn KeyValueStore>, config: &IntakeConfig) -> Self {
        Self::new(store, config.storage_key_prefix.clone(), config.retention)
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    pub fn key(&self, station_id: &str) -> String {
        station_key(&self.key_prefix, station_id)
    }

    pub async fn load(&self, station_id: &str) -> Vec<UploadBatch> {
        self.load_at(station_id, Utc::now()).await
    }

    /// Read the station's batches and drop expired ones.
    ///
    /// Unreadable data is logged and treated as an empty collection. When pruning
    /// removes anything the pruned collection is written back immediately.
    #[tracing::instrument(skip(self), fields(store.operation = "load"))]
    pub async fn load_at(&self, station_id: &str, now: DateTime<Utc>) -> Vec<UploadBatch> {
        let key = self.key(station_id);

        let batches: Vec<UploadBatch> = match read_json(self.store.as_ref(), &key).await {
            Ok(Some(batches)) => batches,
            Ok(None) => return Vec::new(),
            Err(e) => {
                let err = IntakeError::Load(e.to_string());
                tracing::error!(key = %key, error = %err, "Discarding unreadable upload history");
                return Vec::new();
            }
        };

        let loaded = batches.len();
        let kept = prune(batches, now, self.retention);
        let expired = loaded - kept.len();

        if expired > 0 {
            tracing::info!(
                key = %key,
                expired,
                remaining = kept.len(),
                "Pruned expired upload batches"
            );
            if let Err(e) = self.persist(station_id, &kept).await {
                tracing::warn!(key = %key, error = %e, "Failed to write back pruned batches");
            }
        }

        kept
    }

    /// Save the collection. An empty collection removes the entry entirely.
    pub async fn persist(&self, station_id: &str, batches: &[UploadBatch]) -> Result<(), IntakeError> {
        let key = self.key(station_id);

        let result = if batches.is_empty() {
            self.store.remove(&key).await
        } else {
            write_json(self.store.as_ref(), &key, batches).await
        };

        match result {
            Ok(()) => {
                tracing::debug!(key = %key, batches = batches.len(), "Persisted upload batches");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to persist upload batches");
                Err(IntakeError::Persistence(e.to_string()))
            }
        }
    }

    /// Add `batch` to the end of the collection and persist it.
    ///
    /// The in-memory collection keeps the new batch even when persisting fails.
    pub async fn append(
        &self,
        station_id: &str,
        batches: &mut Vec<UploadBatch>,
        batch: UploadBatch,
    ) -> Result<(), IntakeError> {
        batches.push(batch);
        self.persist(station_id, batches).await
    }

    /// Station ids that currently have a saved collection, sorted.
    pub async fn stations_with_history(&self) -> Result<Vec<String>, IntakeError> {
        let prefix = format!("{}_", self.key_prefix);
        let keys = self
            .store
            .keys(&prefix)
            .await
            .map_err(|e| IntakeError::Load(e.to_string()))?;
        Ok(keys
            .into_iter()
            .filter_map(|key| key.strip_prefix(&prefix).map(str::to_string))
            .filter(|station| !station.is_empty())
            .collect())
    }

    /// Remove every batch recorded for the station.
    pub async fn clear(&self, station_id: &str) -> Result<(), IntakeError> {
        self.persist(station_id, &[]).await?;
        tracing::info!(station = %station_id, "Cleared upload history");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vrs_core::{ImageData, ImageRecord};
    use vrs_storage::MemoryStore;

    fn image(url: &str) -> ImageRecord {
        ImageRecord {
            data: ImageData::Remote(url.to_string()),
            name: Some("front.jpg".to_string()),
            content_type: "image/jpeg".to_string(),
            size: 1024,
            public_id: Some("vrs_uploads/AR3/1234/1".to_string()),
        }
    }

    fn batch_store(store: &MemoryStore) -> BatchStore {
        BatchStore::new(Arc::new(store.clone()), "vrsUploads", Duration::days(2))
    }

    #[tokio::test]
    async fn persist_then_load_round_trips() {
        let memory = MemoryStore::new();
        let store = batch_store(&memory);
        let now = Utc::now();
        let batches = vec![
            UploadBatch::new("1234", "AR3", vec![image("https://a/1.jpg")], now - Duration::hours(2)),
            UploadBatch::new("5678", "AR3", vec![image("https://a/2.jpg")], now),
        ];

        store.persist("AR3", &batches).await.unwrap();
        assert_eq!(store.load_at("AR3", now).await, batches);
        assert!(memory.get("vrsUploads_AR3").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn load_prunes_and_writes_back() {
        let memory = MemoryStore::new();
        let store = batch_store(&memory);
        let now = Utc::now();
        let old = UploadBatch::new("1111", "AR3", vec![image("https://a/1.jpg")], now - Duration::days(3));
        let fresh = UploadBatch::new("2222", "AR3", vec![image("https://a/2.jpg")], now);
        store.persist("AR3", &[old, fresh.clone()]).await.unwrap();

        let loaded = store.load_at("AR3", now).await;
        assert_eq!(loaded, vec![fresh.clone()]);

        let raw = memory.get("vrsUploads_AR3").await.unwrap().unwrap();
        let on_disk: Vec<UploadBatch> = serde_json::from_str(&raw).unwrap();
        assert_eq!(on_disk, vec![fresh]);
    }

    #[tokio::test]
    async fn fully_expired_collection_removes_the_entry() {
        let memory = MemoryStore::new();
        let store = batch_store(&memory);
        let now = Utc::now();
        let old = UploadBatch::new("1111", "AR3", vec![image("https://a/1.jpg")], now - Duration::days(3));
        store.persist("AR3", &[old]).await.unwrap();

        assert!(store.load_at("AR3", now).await.is_empty());
        assert_eq!(memory.get("vrsUploads_AR3").await.unwrap(), None);
    }

    #[tokio::test]
    async fn stations_with_history_ignores_other_keys() {
        let memory = MemoryStore::new();
        let store = batch_store(&memory);
        let now = Utc::now();
        store
            .persist("GR1", &[UploadBatch::new("1234", "GR1", vec![image("https://a/1.jpg")], now)])
            .await
            .unwrap();
        store
            .persist("AR3", &[UploadBatch::new("5678", "AR3", vec![image("https://a/2.jpg")], now)])
            .await
            .unwrap();
        memory.set("vrsSession", "{}".to_string()).await.unwrap();

        assert_eq!(store.stations_with_history().await.unwrap(), vec!["AR3", "GR1"]);

        store.clear("AR3").await.unwrap();
        assert_eq!(store.stations_with_history().await.unwrap(), vec!["GR1"]);
    }

    #[tokio::test]
    async fn huge_retention_window_keeps_everything() {
        let memory = MemoryStore::new();
        let store = BatchStore::new(Arc::new(memory.clone()), "vrsUploads", Duration::MAX);
        let now = Utc::now();
        let old = UploadBatch::new("1111", "AR3", vec![image("https://a/1.jpg")], now - Duration::days(3650));
        store.persist("AR3", &[old.clone()]).await.unwrap();

        assert_eq!(store.load_at("AR3", now).await, vec![old]);
    }

    #[tokio::test]
    async fn malformed_data_loads_as_empty() {
        let memory = MemoryStore::new();
        memory
            .set("vrsUploads_AR3", "{not json".to_string())
            .await
            .unwrap();
        let store = batch_store(&memory);

        assert!(store.load("AR3").await.is_empty());
        assert!(store.load("GR1").await.is_empty());
    }

    #[tokio::test]
    async fn failed_append_keeps_in_memory_batch() {
        let memory = MemoryStore::with_quota(Some(16));
        let store = batch_store(&memory);
        let mut batches = Vec::new();

        let batch = UploadBatch::new("1234", "AR3", vec![image("https://a/1.jpg")], Utc::now());
        let err = store.append("AR3", &mut batches, batch).await.unwrap_err();

        assert!(matches!(err, IntakeError::Persistence(_)));
        assert_eq!(batches.len(), 1);
        assert_eq!(memory.get("vrsUploads_AR3").await.unwrap(), None);
    }

    #[tokio::test]
    async fn stations_are_isolated_and_clear_removes_one() {
        let memory = MemoryStore::new();
        let store = batch_store(&memory);
        let now = Utc::now();

        let mut ar3 = Vec::new();
        store
            .append("AR3", &mut ar3, UploadBatch::new("1234", "AR3", vec![image("https://a/1.jpg")], now))
            .await
            .unwrap();
        let mut gr1 = Vec::new();
        store
            .append("GR1", &mut gr1, UploadBatch::new("1234", "GR1", vec![image("https://a/2.jpg")], now))
            .await
            .unwrap();

        store.clear("AR3").await.unwrap();
        assert!(store.load_at("AR3", now).await.is_empty());
        assert_eq!(store.load_at("GR1", now).await, gr1);
    }
}
