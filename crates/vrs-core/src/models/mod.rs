//! Data models for the intake tool
//!
//! Batches are what gets persisted; stations are a fixed lookup table.

mod batch;
mod station;

pub use batch::{display_date, format_file_size, ImageData, ImageRecord, UploadBatch};
pub use station::{name_of, Station, STATION_EMAIL_DOMAIN};
