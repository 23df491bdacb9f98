//! VRS Storage Library
//!
//! Key-value persistence for intake records. Each station's batches live under a
//! single key so a whole collection is read and written at once.
//!
//! # Key format
//!
//! Keys are `{prefix}_{station_id}`, e.g. `vrsUploads_AR3`. Keys are restricted to
//! ASCII letters, digits, `_`, `-` and `.`, and must not contain `..`. Key generation
//! is centralized in the `keys` module so every backend stays consistent.

pub mod factory;
pub mod json;
pub mod keys;
#[cfg(feature = "store-local")]
pub mod local;
#[cfg(feature = "store-memory")]
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use factory::create_store;
pub use json::{read_json, write_json};
pub use keys::{station_key, validate_key};
#[cfg(feature = "store-local")]
pub use local::LocalStore;
#[cfg(feature = "store-memory")]
pub use memory::MemoryStore;
pub use traits::{KeyValueStore, StorageError, StorageResult};
pub use vrs_core::StoreBackend;
