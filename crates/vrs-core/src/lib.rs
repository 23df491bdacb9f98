//! VRS Core Library
//!
//! This crate provides the domain models, error types, configuration, and validation
//! shared by every VRS intake component.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::IntakeConfig;
pub use error::{ErrorMetadata, IntakeError, LogLevel, Presentation, ValidationError};
pub use models::{format_file_size, name_of, ImageData, ImageRecord, Station, UploadBatch};
pub use storage_types::{DuplicatePolicy, StoreBackend, UploadStrategy};
