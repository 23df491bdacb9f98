//! Shared helpers for the `vrs` command-line front end.

use serde::Serialize;
use vrs_core::{format_file_size, name_of, ErrorMetadata, IntakeError, Station, UploadBatch};

/// Store key remembering which station is logged in on this machine.
pub const SESSION_KEY: &str = "vrsSession";

/// Station logged in on this machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct LoginRecord {
    pub station: Station,
    pub logged_in_at: chrono::DateTime<chrono::Utc>,
}

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// One row of the upload history listing.
#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub chassis_id: String,
    pub station: String,
    pub station_name: String,
    pub uploaded: String,
    pub file_count: usize,
    pub total_size: String,
}

impl From<&UploadBatch> for BatchSummary {
    fn from(batch: &UploadBatch) -> Self {
        Self {
            chassis_id: batch.chassis_id.clone(),
            station: batch.station.clone(),
            station_name: name_of(&batch.station),
            uploaded: batch.display_date.clone(),
            file_count: batch.file_count,
            total_size: format_file_size(batch.total_size()),
        }
    }
}

pub fn render_batch_table(batches: &[&UploadBatch]) -> String {
    if batches.is_empty() {
        return "No uploads found".to_string();
    }

    let mut out = format!(
        "{:<8} {:<26} {:>6} {:>10}  {}\n",
        "CHASSIS", "UPLOADED", "FILES", "SIZE", "STATION"
    );
    out.push_str(&"-".repeat(80));
    for batch in batches {
        let summary = BatchSummary::from(*batch);
        out.push_str(&format!(
            "\n{:<8} {:<26} {:>6} {:>10}  {}",
            summary.chassis_id,
            truncate_string(&summary.uploaded, 26),
            summary.file_count,
            summary.total_size,
            truncate_string(&summary.station_name, 24),
        ));
    }
    out
}

pub fn render_batch_detail(batch: &UploadBatch) -> String {
    let mut out = format!(
        "Chassis ID: {}\nStation:    {} ({})\nUploaded:   {}\nFiles:      {}\n",
        batch.chassis_id,
        name_of(&batch.station),
        batch.station,
        batch.display_date,
        batch.file_count
    );
    for (i, image) in batch.images.iter().enumerate() {
        out.push_str(&format!(
            "\n  [{}] {:<32} {:<12} {:>10}  {}",
            i + 1,
            truncate_string(image.name.as_deref().unwrap_or("(unnamed)"), 32),
            image.content_type,
            format_file_size(image.size),
            truncate_string(&image.data.to_string(), 60),
        ));
    }
    out
}

/// Station listing; stations in `with_history` are marked as having saved uploads.
pub fn render_station_table(with_history: &[String]) -> String {
    let mut out = format!("{:<5} {:<34} {:<20} {}\n", "ID", "NAME", "EMAIL", "HISTORY");
    out.push_str(&"-".repeat(72));
    for station in Station::all() {
        let saved = with_history.iter().any(|id| id == station.id());
        out.push_str(&format!(
            "\n{:<5} {:<34} {:<20} {}",
            station.id(),
            station.name(),
            station.email(),
            if saved { "yes" } else { "" }
        ));
    }
    out
}

/// Message for the person at the station, with a retry hint when retrying can help.
pub fn render_error(err: &IntakeError) -> String {
    let message = err.client_message();
    if err.is_recoverable() && !err.is_validation() {
        format!("{} (run the command again to retry)", message.trim_end_matches('.'))
    } else {
        message
    }
}

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays parseable.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,vrs=info")),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vrs_core::{ImageData, ImageRecord};

    #[test]
    fn truncate_string_short() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("", 5), "");
    }

    #[test]
    fn truncate_string_long() {
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("abc", 2), "...");
        assert_eq!(truncate_string("Mampong-Ashanti Station", 10), "Mampong...");
    }

    #[test]
    fn summary_uses_station_name_and_formatted_size() {
        let batch = UploadBatch::new(
            "1234",
            "AR3",
            vec![ImageRecord {
                data: ImageData::Remote("https://a/1.jpg".to_string()),
                name: None,
                content_type: "image/jpeg".to_string(),
                size: 1536,
                public_id: None,
            }],
            Utc::now(),
        );
        let summary = BatchSummary::from(&batch);
        assert_eq!(summary.station_name, "Kumasi Station");
        assert_eq!(summary.total_size, "1.5 KB");

        let table = render_batch_table(&[&batch]);
        assert!(table.contains("1234"));
        assert!(table.contains("Kumasi Station"));
        assert!(render_batch_detail(&batch).contains("(unnamed)"));
    }

    #[test]
    fn empty_listing_says_so() {
        assert_eq!(render_batch_table(&[]), "No uploads found");
    }

    #[test]
    fn station_table_lists_every_station() {
        let table = render_station_table(&["AR3".to_string()]);
        assert!(table.contains("gr2@dvlavrs.app"));
        assert_eq!(table.lines().count(), 2 + Station::all().len());

        let ar3 = table.lines().find(|l| l.starts_with("AR3")).unwrap();
        assert!(ar3.trim_end().ends_with("yes"));
        let gr2 = table.lines().find(|l| l.starts_with("GR2")).unwrap();
        assert!(!gr2.trim_end().ends_with("yes"));
    }

    #[test]
    fn recoverable_errors_suggest_a_retry() {
        let err = IntakeError::upload_failed("rear.jpg", Some("gateway timeout".to_string()));
        assert_eq!(
            render_error(&err),
            "Failed to upload images: gateway timeout. Please try again (run the command again to retry)"
        );

        let err = IntakeError::UnknownStation("nobody@example.com".to_string());
        assert_eq!(render_error(&err), "Email not recognized as a valid station");

        let err = IntakeError::from(vrs_core::ValidationError::NoFilesSelected);
        assert_eq!(render_error(&err), "Please select at least one image");
    }
}
