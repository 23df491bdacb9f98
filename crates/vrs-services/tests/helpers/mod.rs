#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Duration;
use std::sync::{Arc, Mutex};
use vrs_core::{DuplicatePolicy, IntakeConfig, Station, UploadStrategy};
use vrs_services::{
    BatchStore, GatewayError, GatewayRequest, GatewayUpload, MediaGateway, MemoryStore,
    PendingFile, SessionState, UploadOrchestrator,
};

/// Gateway that succeeds until the configured 1-based call, which fails.
#[derive(Default)]
pub struct FakeGateway {
    pub fail_on: Option<usize>,
    pub failure_message: Option<String>,
    pub requests: Mutex<Vec<GatewayRequest>>,
}

impl FakeGateway {
    pub fn failing_on(call: usize, message: Option<&str>) -> Self {
        Self {
            fail_on: Some(call),
            failure_message: message.map(String::from),
            requests: Mutex::default(),
        }
    }

    pub fn uploaded_names(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.filename.clone())
            .collect()
    }
}

#[async_trait]
impl MediaGateway for FakeGateway {
    async fn upload(&self, request: GatewayRequest) -> Result<GatewayUpload, GatewayError> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        if Some(requests.len()) == self.fail_on {
            return Err(GatewayError::Rejected {
                status: 500,
                message: self.failure_message.clone(),
            });
        }
        Ok(GatewayUpload {
            url: format!(
                "https://res.cloudinary.com/demo/image/upload/{}/{}.jpg",
                request.folder, request.public_id
            ),
            public_id: format!("{}/{}", request.folder, request.public_id),
        })
    }
}

pub fn gateway_config() -> IntakeConfig {
    IntakeConfig {
        gateway_url: Some("https://example.com/api/upload".to_string()),
        ..IntakeConfig::default()
    }
}

pub fn inline_config() -> IntakeConfig {
    IntakeConfig {
        upload_strategy: UploadStrategy::Inline,
        duplicate_policy: DuplicatePolicy::Reject,
        ..IntakeConfig::default()
    }
}

pub fn batch_store(memory: &MemoryStore, config: &IntakeConfig) -> BatchStore {
    BatchStore::from_config(Arc::new(memory.clone()), config)
}

pub async fn gateway_session(
    station: Station,
    memory: &MemoryStore,
    gateway: Arc<FakeGateway>,
) -> SessionState {
    let config = gateway_config();
    let gateway: Arc<dyn MediaGateway> = gateway;
    let orchestrator = UploadOrchestrator::new(&config, Some(gateway)).unwrap();
    SessionState::open(station, batch_store(memory, &config), Some(orchestrator), config.warning_ttl).await
}

pub async fn inline_session(station: Station, memory: &MemoryStore) -> SessionState {
    let config = inline_config();
    let orchestrator = UploadOrchestrator::new(&config, None).unwrap();
    SessionState::open(station, batch_store(memory, &config), Some(orchestrator), config.warning_ttl).await
}

/// Session for a station with no upload pipeline configured.
pub async fn browse_session(station: Station, memory: &MemoryStore) -> SessionState {
    let config = IntakeConfig::default();
    SessionState::open(station, batch_store(memory, &config), None, config.warning_ttl).await
}

pub fn jpeg(name: &str, len: usize) -> PendingFile {
    PendingFile::from_bytes(name, "image/jpeg", vec![0xAB; len])
}

pub fn retention() -> Duration {
    Duration::days(2)
}
