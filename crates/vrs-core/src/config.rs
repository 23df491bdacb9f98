//! Configuration module
//!
//! Intake configuration is read from `VRS_*` environment variables (a `.env` file is
//! honoured). Retention and size limits are policy, so they live here rather than in
//! the store or orchestrator.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::storage_types::{DuplicatePolicy, StoreBackend, UploadStrategy};

const RETENTION_HOURS: i64 = 48;
const MAX_RETENTION_HOURS: i64 = 24 * 365 * 10;
const MAX_FILE_SIZE_MB: usize = 4;
const STORE_QUOTA_BYTES: u64 = 5 * 1024 * 1024;
const GATEWAY_TIMEOUT_SECS: u64 = 60;
const WARNING_TTL_SECS: u64 = 5;
const STORAGE_KEY_PREFIX: &str = "vrsUploads";
const UPLOAD_FOLDER: &str = "vrs_uploads";
const STORE_PATH: &str = ".vrs/store";

/// Intake configuration
#[derive(Clone, Debug)]
pub struct IntakeConfig {
    pub environment: String,
    // Store configuration
    pub store_backend: StoreBackend,
    pub store_path: PathBuf,
    /// Total capacity of the store in bytes. `None` means unlimited.
    pub store_quota_bytes: Option<u64>,
    pub storage_key_prefix: String,
    pub retention: chrono::Duration,
    // Upload configuration
    pub upload_strategy: UploadStrategy,
    pub duplicate_policy: DuplicatePolicy,
    pub max_file_size_bytes: usize,
    pub upload_folder: String,
    // Gateway configuration
    pub gateway_url: Option<String>,
    pub gateway_api_key: Option<String>,
    pub gateway_timeout: Duration,
    // Front end
    pub warning_ttl: Duration,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            store_backend: StoreBackend::Local,
            store_path: PathBuf::from(STORE_PATH),
            store_quota_bytes: Some(STORE_QUOTA_BYTES),
            storage_key_prefix: STORAGE_KEY_PREFIX.to_string(),
            retention: chrono::Duration::hours(RETENTION_HOURS),
            upload_strategy: UploadStrategy::Gateway,
            duplicate_policy: UploadStrategy::Gateway.default_duplicate_policy(),
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            upload_folder: UPLOAD_FOLDER.to_string(),
            gateway_url: None,
            gateway_api_key: None,
            gateway_timeout: Duration::from_secs(GATEWAY_TIMEOUT_SECS),
            warning_ttl: Duration::from_secs(WARNING_TTL_SECS),
        }
    }
}

impl IntakeConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = Self::from_vars(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from an arbitrary variable source.
    ///
    /// Unparseable numeric values fall back to their defaults; unparseable enum
    /// values are rejected so a typo in a policy never silently flips behavior.
    pub fn from_vars<F>(var: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or(defaults.environment);

        let store_backend = match var("VRS_STORE_BACKEND") {
            Some(s) => s.parse()?,
            None => defaults.store_backend,
        };

        let upload_strategy: UploadStrategy = match var("VRS_UPLOAD_STRATEGY") {
            Some(s) => s.parse()?,
            None => defaults.upload_strategy,
        };

        let duplicate_policy = match var("VRS_DUPLICATE_POLICY") {
            Some(s) => s.parse()?,
            None => upload_strategy.default_duplicate_policy(),
        };

        let store_quota_bytes = var("VRS_STORE_QUOTA_BYTES")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(STORE_QUOTA_BYTES);

        let retention_hours = var("VRS_RETENTION_HOURS")
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(RETENTION_HOURS);

        let max_file_size_mb = var("VRS_MAX_FILE_SIZE_MB")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(MAX_FILE_SIZE_MB);

        Ok(IntakeConfig {
            environment,
            store_backend,
            store_path: var("VRS_STORE_PATH")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            store_quota_bytes: (store_quota_bytes > 0).then_some(store_quota_bytes),
            storage_key_prefix: var("VRS_STORAGE_KEY_PREFIX")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.storage_key_prefix),
            retention: chrono::Duration::try_hours(retention_hours).ok_or_else(|| {
                anyhow::anyhow!(
                    "VRS_RETENTION_HOURS is out of range: {}",
                    retention_hours
                )
            })?,
            upload_strategy,
            duplicate_policy,
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            upload_folder: var("VRS_UPLOAD_FOLDER")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.upload_folder),
            gateway_url: var("VRS_GATEWAY_URL").filter(|s| !s.trim().is_empty()),
            gateway_api_key: var("VRS_GATEWAY_API_KEY").filter(|s| !s.is_empty()),
            gateway_timeout: Duration::from_secs(
                var("VRS_GATEWAY_TIMEOUT_SECS")
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(GATEWAY_TIMEOUT_SECS),
            ),
            warning_ttl: Duration::from_secs(
                var("VRS_WARNING_TTL_SECS")
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(WARNING_TTL_SECS),
            ),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.retention <= chrono::Duration::zero() {
            return Err(anyhow::anyhow!("VRS_RETENTION_HOURS must be greater than 0"));
        }
        if self.retention > chrono::Duration::hours(MAX_RETENTION_HOURS) {
            return Err(anyhow::anyhow!(
                "VRS_RETENTION_HOURS must be at most {}",
                MAX_RETENTION_HOURS
            ));
        }

        if self.upload_strategy == UploadStrategy::Gateway {
            let url = self.gateway_url.as_deref().ok_or_else(|| {
                anyhow::anyhow!("VRS_GATEWAY_URL must be set when using the gateway upload strategy")
            })?;
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(anyhow::anyhow!(
                    "VRS_GATEWAY_URL must be an http(s) URL, got '{}'",
                    url
                ));
            }
            if self.is_production() && !url.starts_with("https://") {
                return Err(anyhow::anyhow!(
                    "VRS_GATEWAY_URL must use https in production"
                ));
            }
            if self.max_file_size_bytes == 0 {
                return Err(anyhow::anyhow!(
                    "VRS_MAX_FILE_SIZE_MB must be greater than 0 for the gateway upload strategy"
                ));
            }
        }

        if self.storage_key_prefix.contains(['/', '\\']) {
            return Err(anyhow::anyhow!(
                "VRS_STORAGE_KEY_PREFIX must not contain path separators"
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}
