use crate::keys::validate_key;
use crate::traits::{check_quota, KeyValueStore, StorageResult};
use crate::StoreBackend;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-process store. Clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    quota_bytes: Option<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: Option<u64>) -> Self {
        Self {
            entries: Arc::default(),
            quota_bytes,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map; keep serving it.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        validate_key(key)?;
        Ok(self.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> StorageResult<()> {
        validate_key(key)?;
        let mut entries = self.lock();
        let current_total: u64 = entries.values().map(|v| v.len() as u64).sum();
        let replaced = entries.get(key).map(|v| v.len() as u64).unwrap_or(0);
        check_quota(self.quota_bytes, current_total, replaced, value.len() as u64)?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.lock().remove(key);
        Ok(())
    }

    async fn keys(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .lock()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn used_bytes(&self) -> StorageResult<u64> {
        Ok(self.lock().values().map(|v| v.len() as u64).sum())
    }

    fn backend_type(&self) -> StoreBackend {
        StoreBackend::Memory
    }
}
