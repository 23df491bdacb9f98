//! Media gateway implementations.

mod http;

pub use http::HttpMediaGateway;

use std::sync::Arc;
use vrs_core::{IntakeConfig, UploadStrategy};

use crate::upload::MediaGateway;

/// Create the gateway the configured upload strategy needs, if any.
pub fn create_gateway(config: &IntakeConfig) -> anyhow::Result<Option<Arc<dyn MediaGateway>>> {
    if config.upload_strategy != UploadStrategy::Gateway {
        return Ok(None);
    }

    let url = config
        .gateway_url
        .clone()
        .ok_or_else(|| anyhow::anyhow!("VRS_GATEWAY_URL not configured"))?;
    let gateway = HttpMediaGateway::new(url, config.gateway_api_key.clone(), config.gateway_timeout)?;
    Ok(Some(Arc::new(gateway)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_strategy_needs_no_gateway() {
        let config = IntakeConfig {
            upload_strategy: UploadStrategy::Inline,
            ..IntakeConfig::default()
        };
        assert!(create_gateway(&config).unwrap().is_none());
    }

    #[test]
    fn gateway_strategy_builds_http_gateway() {
        let config = IntakeConfig {
            gateway_url: Some("https://example.com/api/upload".to_string()),
            ..IntakeConfig::default()
        };
        assert!(create_gateway(&config).unwrap().is_some());

        assert!(create_gateway(&IntakeConfig::default()).is_err());
    }
}
