use anyhow::Context;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::upload::{GatewayError, GatewayRequest, GatewayUpload, MediaGateway};

/// Body returned by the upload endpoint: `{url, public_id}` or `{error}`.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: Option<String>,
    public_id: Option<String>,
    error: Option<String>,
}

/// Gateway speaking the upload proxy's multipart protocol.
#[derive(Clone, Debug)]
pub struct HttpMediaGateway {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpMediaGateway {
    pub fn new(endpoint: String, api_key: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn form(request: GatewayRequest) -> Result<Form, GatewayError> {
        let part = Part::bytes(request.bytes.to_vec())
            .file_name(request.filename)
            .mime_str(&request.content_type)
            .map_err(|e| GatewayError::Transport(format!("Invalid content type: {}", e)))?;

        Ok(Form::new()
            .part("file", part)
            .text("stationId", request.station_id)
            .text("chassisId", request.chassis_id)
            .text("folder", request.folder)
            .text("public_id", request.public_id))
    }
}

#[async_trait]
impl MediaGateway for HttpMediaGateway {
    async fn upload(&self, request: GatewayRequest) -> Result<GatewayUpload, GatewayError> {
        let start = std::time::Instant::now();
        let size = request.bytes.len();
        let form = Self::form(request)?;

        let mut builder = self.client.post(&self.endpoint).multipart(form);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::Transport(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(format!("Failed to read response: {}", e)))?;
        let body: Option<UploadResponse> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message: body.and_then(|b| b.error).filter(|m| !m.trim().is_empty()),
            });
        }

        let body = body.ok_or_else(|| {
            GatewayError::InvalidResponse("Failed to parse response as JSON".to_string())
        })?;

        if let Some(error) = body.error {
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message: Some(error),
            });
        }

        match (body.url, body.public_id) {
            (Some(url), Some(public_id)) => {
                tracing::debug!(
                    endpoint = %self.endpoint,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Gateway upload successful"
                );
                Ok(GatewayUpload { url, public_id })
            }
            _ => Err(GatewayError::InvalidResponse(
                "Response is missing url or public_id".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use mockito::Matcher;

    fn request() -> GatewayRequest {
        GatewayRequest {
            bytes: Bytes::from_static(b"jpeg-bytes"),
            content_type: "image/jpeg".to_string(),
            filename: "front.jpg".to_string(),
            station_id: "AR3".to_string(),
            chassis_id: "1234".to_string(),
            folder: "vrs_uploads".to_string(),
            public_id: "AR3/1234/1700000000000".to_string(),
        }
    }

    fn gateway(server: &mockito::ServerGuard, api_key: Option<&str>) -> HttpMediaGateway {
        HttpMediaGateway::new(
            format!("{}/api/upload", server.url()),
            api_key.map(String::from),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn successful_upload_returns_url_and_public_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/upload")
            .match_header("authorization", "Bearer secret")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="stationId""#.to_string()),
                Matcher::Regex(r#"name="chassisId""#.to_string()),
                Matcher::Regex("AR3/1234/1700000000000".to_string()),
                Matcher::Regex(r#"filename="front.jpg""#.to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"url":"https://res.example.com/image/upload/v1/x.jpg","public_id":"vrs_uploads/AR3/1234/1700000000000"}"#)
            .create_async()
            .await;

        let uploaded = gateway(&server, Some("secret")).upload(request()).await.unwrap();

        assert_eq!(uploaded.url, "https://res.example.com/image/upload/v1/x.jpg");
        assert_eq!(uploaded.public_id, "vrs_uploads/AR3/1234/1700000000000");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_body_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/upload")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"Cloud storage quota exceeded"}"#)
            .create_async()
            .await;

        let err = gateway(&server, None).upload(request()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Rejected { status: 500, .. }));
        assert_eq!(err.user_message().as_deref(), Some("Cloud storage quota exceeded"));
    }

    #[tokio::test]
    async fn failure_without_message_has_no_user_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/upload")
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;

        let err = gateway(&server, None).upload(request()).await.unwrap_err();
        assert_eq!(err.user_message(), None);
    }

    #[tokio::test]
    async fn incomplete_success_body_is_invalid() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/upload")
            .with_status(200)
            .with_body(r#"{"url":"https://res.example.com/x.jpg"}"#)
            .create_async()
            .await;

        let err = gateway(&server, None).upload(request()).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponse(_)));
    }
}
