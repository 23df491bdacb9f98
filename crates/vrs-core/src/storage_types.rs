use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Key-value store backend types
///
/// Defined in core because it's used in configuration and by the storage factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Local,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(StoreBackend::Local),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(anyhow::anyhow!("Invalid store backend: {}", s)),
        }
    }
}

impl Display for StoreBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StoreBackend::Local => write!(f, "local"),
            StoreBackend::Memory => write!(f, "memory"),
        }
    }
}

/// How a submission turns selected files into stored images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStrategy {
    /// Upload each file to the media gateway, one at a time, and keep the returned URL.
    Gateway,
    /// Encode each file as an inline data URL and keep it in the local store.
    Inline,
}

impl UploadStrategy {
    /// Duplicate handling used when none is configured explicitly.
    pub fn default_duplicate_policy(self) -> DuplicatePolicy {
        match self {
            UploadStrategy::Gateway => DuplicatePolicy::Allow,
            UploadStrategy::Inline => DuplicatePolicy::Reject,
        }
    }
}

impl FromStr for UploadStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gateway" | "remote" => Ok(UploadStrategy::Gateway),
            "inline" | "local" => Ok(UploadStrategy::Inline),
            _ => Err(anyhow::anyhow!("Invalid upload strategy: {}", s)),
        }
    }
}

impl Display for UploadStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UploadStrategy::Gateway => write!(f, "gateway"),
            UploadStrategy::Inline => write!(f, "inline"),
        }
    }
}

/// What to do when a station submits a chassis id it already holds a batch for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    Reject,
    Allow,
}

impl FromStr for DuplicatePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(DuplicatePolicy::Reject),
            "allow" => Ok(DuplicatePolicy::Allow),
            _ => Err(anyhow::anyhow!("Invalid duplicate policy: {}", s)),
        }
    }
}

impl Display for DuplicatePolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DuplicatePolicy::Reject => write!(f, "reject"),
            DuplicatePolicy::Allow => write!(f, "allow"),
        }
    }
}
