//! VRS Services Layer
//!
//! Business services for station image intake: the batch store with retention and
//! search, the upload orchestrator and its media gateway, downloads, camera capture,
//! and the per-station session that ties them together. Front ends depend on this
//! crate alone.

pub mod batch_store;
pub mod capture;
pub mod download;
pub mod gateway;
pub mod session;
pub mod upload;

pub use batch_store::{find_by_chassis_id, prune, search, BatchStore};
pub use capture::{capture_pending, captured_file, ImageCapture, ReaderCapture};
pub use download::{
    attachment_url, download_filename, BatchDownloader, Downloader, FsDownloader,
    DEFAULT_DOWNLOAD_DELAY,
};
pub use gateway::{create_gateway, HttpMediaGateway};
pub use session::{SessionState, TransientWarning};
pub use upload::{
    FileSource, GatewayError, GatewayRequest, GatewayUpload, MediaGateway, PendingFile,
    Submission, UploadOrchestrator,
};
pub use vrs_storage::{create_store, KeyValueStore, LocalStore, MemoryStore, StorageError};
