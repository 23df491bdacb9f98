//! Typed JSON access on top of a [`KeyValueStore`].

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{KeyValueStore, StorageResult};

/// Read and decode the value at `key`. A missing key yields `Ok(None)`; a value that
/// does not decode yields [`crate::StorageError::Serialization`].
pub async fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> StorageResult<Option<T>> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode `value` and store it at `key`.
pub async fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> StorageResult<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, raw).await
}
