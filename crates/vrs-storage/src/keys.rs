//! Shared key generation for store backends.
//!
//! Key format: `{prefix}_{station_id}`.

use crate::{StorageError, StorageResult};

/// Generate the store key holding a station's batches.
pub fn station_key(prefix: &str, station_id: &str) -> String {
    format!("{}_{}", prefix, station_id)
}

/// Reject keys that are empty, contain `..`, or use characters outside
/// `[A-Za-z0-9_.-]`. Backends that map keys to paths rely on this.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Store key is empty".to_string()));
    }
    if key.contains("..") {
        return Err(StorageError::InvalidKey(format!(
            "Store key contains a path traversal sequence: {}",
            key
        )));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(StorageError::InvalidKey(format!(
            "Store key contains invalid characters: {}",
            key
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_keys_are_namespaced() {
        assert_eq!(station_key("vrsUploads", "AR3"), "vrsUploads_AR3");
        assert!(validate_key(&station_key("vrsUploads", "GR1")).is_ok());
    }

    #[test]
    fn unsafe_keys_are_rejected() {
        for key in ["", "..", "a/b", "../etc", "a\\b", "key with space"] {
            assert!(validate_key(key).is_err(), "{key:?} should be rejected");
        }
    }
}
