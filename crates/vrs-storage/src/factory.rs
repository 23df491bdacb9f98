#[cfg(feature = "store-local")]
use crate::LocalStore;
#[cfg(feature = "store-memory")]
use crate::MemoryStore;
use crate::{KeyValueStore, StoreBackend, StorageError, StorageResult};
use std::sync::Arc;
use vrs_core::IntakeConfig;

/// Create a store backend based on configuration
pub async fn create_store(config: &IntakeConfig) -> StorageResult<Arc<dyn KeyValueStore>> {
    match config.store_backend {
        #[cfg(feature = "store-local")]
        StoreBackend::Local => {
            if config.store_path.as_os_str().is_empty() {
                return Err(StorageError::Config(
                    "VRS_STORE_PATH not configured".to_string(),
                ));
            }
            let store = LocalStore::new(&config.store_path, config.store_quota_bytes).await?;
            tracing::debug!(
                path = %config.store_path.display(),
                quota_bytes = ?config.store_quota_bytes,
                "Using local store"
            );
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "store-local"))]
        StoreBackend::Local => Err(StorageError::Config(
            "Local store backend not available (store-local feature not enabled)".to_string(),
        )),

        #[cfg(feature = "store-memory")]
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::with_quota(config.store_quota_bytes))),

        #[cfg(not(feature = "store-memory"))]
        StoreBackend::Memory => Err(StorageError::Config(
            "Memory store backend not available (store-memory feature not enabled)".to_string(),
        )),
    }
}
