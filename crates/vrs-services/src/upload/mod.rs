//! Submission validation and upload sequencing.

mod service;
mod traits;
mod types;

pub use service::UploadOrchestrator;
pub use traits::{GatewayError, GatewayRequest, GatewayUpload, MediaGateway};
pub use types::{FileSource, PendingFile, Submission};
