//! Error types module
//!
//! All intake failures are unified under [`IntakeError`]. Input problems the user can
//! fix are grouped in [`ValidationError`] so the front end can surface them verbatim,
//! while gateway, persistence and load failures carry enough metadata for the caller
//! to decide whether to block, warn, or stay silent.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like a full store
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// How an error should be surfaced to the person at the station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// Shown in place of the result; the action did not happen.
    Blocking,
    /// Shown briefly; the action happened but something degraded.
    TransientWarning,
    /// Logged only.
    Silent,
}

/// Metadata describing how an error should be presented
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "INVALID_CHASSIS_ID")
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same action may succeed
    fn is_recoverable(&self) -> bool;

    /// Message suitable for the person at the station
    fn client_message(&self) -> String;

    /// How the front end should surface this error
    fn presentation(&self) -> Presentation;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Caller-correctable input problems, checked before any network or storage action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid chassis id '{0}': enter exactly 4 numbers")]
    InvalidChassisId(String),

    #[error("No files selected: select at least one image")]
    NoFilesSelected,

    #[error("{count} file(s) exceed the {limit_mb}MB size limit")]
    FileTooLarge { count: usize, limit_mb: usize },

    #[error("Unsupported file type '{content_type}' for {file}: only images are accepted")]
    UnsupportedFileType { file: String, content_type: String },

    #[error("Chassis id {0} was already uploaded at this station")]
    DuplicateChassisId(String),
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Upload failed for {file}: {message}")]
    Upload { file: String, message: String },

    #[error("Failed to save uploads: {0}")]
    Persistence(String),

    #[error("Failed to load saved uploads: {0}")]
    Load(String),

    #[error("Unknown station: {0}")]
    UnknownStation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for IntakeError {
    fn from(err: anyhow::Error) -> Self {
        IntakeError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for IntakeError {
    fn from(err: io::Error) -> Self {
        IntakeError::Internal(format!("IO error: {}", err))
    }
}

impl IntakeError {
    /// Gateway failure with the fallback message used when the gateway gave none.
    pub fn upload_failed(file: impl Into<String>, message: Option<String>) -> Self {
        IntakeError::Upload {
            file: file.into(),
            message: message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "Upload failed".to_string()),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, IntakeError::Validation(_))
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

/// Static metadata per variant: (error_code, recoverable, presentation, log_level).
fn intake_error_static_metadata(
    err: &IntakeError,
) -> (&'static str, bool, Presentation, LogLevel) {
    match err {
        IntakeError::Validation(v) => (
            v.error_code(),
            false,
            Presentation::Blocking,
            LogLevel::Debug,
        ),
        IntakeError::Upload { .. } => (
            "UPLOAD_FAILED",
            true,
            Presentation::Blocking,
            LogLevel::Warn,
        ),
        IntakeError::Persistence(_) => (
            "PERSISTENCE_FAILED",
            true,
            Presentation::TransientWarning,
            LogLevel::Warn,
        ),
        IntakeError::Load(_) => ("LOAD_FAILED", false, Presentation::Silent, LogLevel::Error),
        IntakeError::UnknownStation(_) => (
            "UNKNOWN_STATION",
            false,
            Presentation::Blocking,
            LogLevel::Debug,
        ),
        IntakeError::NotFound(_) => ("NOT_FOUND", false, Presentation::Blocking, LogLevel::Debug),
        IntakeError::Internal(_) | IntakeError::InternalWithSource { .. } => (
            "INTERNAL_ERROR",
            true,
            Presentation::Blocking,
            LogLevel::Error,
        ),
    }
}

impl ValidationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::InvalidChassisId(_) => "INVALID_CHASSIS_ID",
            ValidationError::NoFilesSelected => "NO_FILES_SELECTED",
            ValidationError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            ValidationError::UnsupportedFileType { .. } => "UNSUPPORTED_FILE_TYPE",
            ValidationError::DuplicateChassisId(_) => "DUPLICATE_CHASSIS_ID",
        }
    }

    fn client_message(&self) -> String {
        match self {
            ValidationError::InvalidChassisId(_) => {
                "Please enter exactly 4 numbers for the Chassis ID".to_string()
            }
            ValidationError::NoFilesSelected => "Please select at least one image".to_string(),
            ValidationError::FileTooLarge { count, limit_mb } => format!(
                "{} file(s) exceed the {}MB size limit. Please compress or select smaller images.",
                count, limit_mb
            ),
            ValidationError::UnsupportedFileType { file, .. } => {
                format!("{} is not an image. Please select image files only.", file)
            }
            ValidationError::DuplicateChassisId(id) => format!(
                "Chassis ID {} has already been uploaded. Search for it under View Uploads.",
                id
            ),
        }
    }
}

impl ErrorMetadata for IntakeError {
    fn error_code(&self) -> &'static str {
        intake_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        intake_error_static_metadata(self).1
    }

    fn presentation(&self) -> Presentation {
        intake_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        intake_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            IntakeError::Validation(v) => v.client_message(),
            IntakeError::Upload { message, .. } => {
                format!("Failed to upload images: {}. Please try again.", message)
            }
            IntakeError::Persistence(_) => {
                "Uploads could not be saved on this device; they remain visible for this session"
                    .to_string()
            }
            IntakeError::Load(_) => String::new(),
            IntakeError::UnknownStation(_) => {
                "Email not recognized as a valid station".to_string()
            }
            IntakeError::NotFound(ref msg) => msg.clone(),
            IntakeError::Internal(_) | IntakeError::InternalWithSource { .. } => {
                "An unexpected error occurred. Please try again.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_block_and_are_not_retried() {
        let err = IntakeError::from(ValidationError::InvalidChassisId("12a4".to_string()));
        assert_eq!(err.error_code(), "INVALID_CHASSIS_ID");
        assert!(!err.is_recoverable());
        assert_eq!(err.presentation(), Presentation::Blocking);
        assert_eq!(err.log_level(), LogLevel::Debug);
        assert!(err.is_validation());
        assert_eq!(
            err.client_message(),
            "Please enter exactly 4 numbers for the Chassis ID"
        );
    }

    #[test]
    fn file_too_large_names_the_count() {
        let err = IntakeError::from(ValidationError::FileTooLarge {
            count: 2,
            limit_mb: 4,
        });
        assert!(err.client_message().starts_with("2 file(s) exceed the 4MB"));
        assert_eq!(err.error_code(), "FILE_TOO_LARGE");
    }

    #[test]
    fn upload_failure_falls_back_to_generic_message() {
        let err = IntakeError::upload_failed("b.jpg", None);
        assert!(matches!(err, IntakeError::Upload { ref message, .. } if message == "Upload failed"));

        let err = IntakeError::upload_failed("b.jpg", Some("  ".to_string()));
        assert!(matches!(err, IntakeError::Upload { ref message, .. } if message == "Upload failed"));

        let err = IntakeError::upload_failed("b.jpg", Some("quota exhausted".to_string()));
        assert!(err.client_message().contains("quota exhausted"));
        assert!(err.to_string().contains("b.jpg"));
    }

    #[test]
    fn persistence_is_a_transient_warning_and_load_is_silent() {
        let err = IntakeError::Persistence("quota exceeded".to_string());
        assert_eq!(err.presentation(), Presentation::TransientWarning);
        assert!(err.is_recoverable());

        let err = IntakeError::Load("bad json".to_string());
        assert_eq!(err.presentation(), Presentation::Silent);
        assert!(err.client_message().is_empty());
    }

    #[test]
    fn detailed_message_includes_source_chain() {
        let err = IntakeError::from(anyhow::anyhow!("inner").context("outer"));
        let details = err.detailed_message();
        assert!(details.contains("Internal error with source"));
        assert!(details.contains("Caused by"));
    }
}
