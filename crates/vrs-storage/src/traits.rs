//! Key-value store abstraction
//!
//! This module defines the KeyValueStore trait that all store backends must implement.

use crate::StoreBackend;
use async_trait::async_trait;
use thiserror::Error;

/// Store operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Store quota exceeded: writing {requested} bytes would use {would_use} of {quota} bytes")]
    QuotaExceeded {
        requested: u64,
        would_use: u64,
        quota: u64,
    },

    #[error("Invalid store key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StorageError {
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, StorageError::QuotaExceeded { .. })
    }
}

/// Result type for store operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Key-value store abstraction
///
/// Values are opaque strings. A `set` either replaces the whole value or leaves the
/// previous one untouched; backends never expose a partially written value.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// Fails with [`StorageError::QuotaExceeded`] when the backend has a capacity
    /// limit and the write would exceed it.
    async fn set(&self, key: &str, value: String) -> StorageResult<()>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> StorageResult<()>;

    /// List keys starting with `prefix`, sorted.
    async fn keys(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Total bytes currently stored.
    async fn used_bytes(&self) -> StorageResult<u64>;

    /// Get the store backend type
    fn backend_type(&self) -> StoreBackend;
}

/// Check a pending write against an optional quota.
///
/// `current_total` includes the value being replaced, which is subtracted first.
pub(crate) fn check_quota(
    quota: Option<u64>,
    current_total: u64,
    replaced: u64,
    requested: u64,
) -> StorageResult<()> {
    let Some(quota) = quota else {
        return Ok(());
    };
    let would_use = current_total.saturating_sub(replaced) + requested;
    if would_use > quota {
        return Err(StorageError::QuotaExceeded {
            requested,
            would_use,
            quota,
        });
    }
    Ok(())
}
