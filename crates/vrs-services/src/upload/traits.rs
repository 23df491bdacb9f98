use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Errors returned by a media gateway
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The gateway answered and refused the file.
    #[error("Gateway rejected upload (status {status}): {}", message.as_deref().unwrap_or("no message"))]
    Rejected { status: u16, message: Option<String> },

    #[error("Gateway request failed: {0}")]
    Transport(String),

    #[error("Gateway returned an invalid response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// Message to show for a failed file. `None` means the gateway gave no reason.
    pub fn user_message(&self) -> Option<String> {
        match self {
            GatewayError::Rejected { message, .. } => message.clone(),
            GatewayError::Transport(msg) | GatewayError::InvalidResponse(msg) => Some(msg.clone()),
        }
    }
}

/// One file sent to the gateway.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub bytes: Bytes,
    pub content_type: String,
    pub filename: String,
    pub station_id: String,
    pub chassis_id: String,
    pub folder: String,
    pub public_id: String,
}

/// Durable location of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayUpload {
    pub url: String,
    pub public_id: String,
}

/// Remote media host accepting one file per call.
#[async_trait]
pub trait MediaGateway: Send + Sync {
    async fn upload(&self, request: GatewayRequest) -> Result<GatewayUpload, GatewayError>;
}
