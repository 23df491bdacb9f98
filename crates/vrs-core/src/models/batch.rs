use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an image's bytes live.
///
/// Persisted as a single string: inline images are `data:` URLs, remote images are
/// whatever URL the media gateway returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImageData {
    Inline(String),
    Remote(String),
}

impl ImageData {
    /// Build a `data:<mime>;base64,<payload>` URL from raw bytes.
    pub fn inline_from_bytes(content_type: &str, bytes: &[u8]) -> Self {
        use base64::{engine::general_purpose::STANDARD, Engine};
        ImageData::Inline(format!(
            "data:{};base64,{}",
            content_type,
            STANDARD.encode(bytes)
        ))
    }

    pub fn as_str(&self) -> &str {
        match self {
            ImageData::Inline(s) | ImageData::Remote(s) => s,
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, ImageData::Inline(_))
    }

    /// Decode an inline image back to bytes. Returns `None` for remote images or
    /// malformed data URLs.
    pub fn decode_inline(&self) -> Option<Vec<u8>> {
        use base64::{engine::general_purpose::STANDARD, Engine};
        let ImageData::Inline(url) = self else {
            return None;
        };
        let (header, payload) = url.strip_prefix("data:")?.split_once(',')?;
        if !header.ends_with(";base64") {
            return None;
        }
        STANDARD.decode(payload).ok()
    }
}

impl From<String> for ImageData {
    fn from(value: String) -> Self {
        if value.starts_with("data:") {
            ImageData::Inline(value)
        } else {
            ImageData::Remote(value)
        }
    }
}

impl From<ImageData> for String {
    fn from(value: ImageData) -> Self {
        match value {
            ImageData::Inline(s) | ImageData::Remote(s) => s,
        }
    }
}

impl fmt::Display for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageData::Inline(s) => write!(f, "inline image ({} bytes encoded)", s.len()),
            ImageData::Remote(s) => f.write_str(s),
        }
    }
}

/// One image within an upload batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub data: ImageData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub content_type: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
}

/// One submitted set of images for one chassis at one station.
///
/// Field names follow the persisted layout so that stores written by earlier
/// versions of the intake tool remain readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadBatch {
    #[serde(rename = "id")]
    pub chassis_id: String,
    pub images: Vec<ImageRecord>,
    pub timestamp: DateTime<Utc>,
    pub display_date: String,
    pub file_count: usize,
    pub station: String,
}

impl UploadBatch {
    /// Create a batch stamped at `now`. The display date and file count are derived
    /// here once and never recomputed.
    pub fn new(
        chassis_id: impl Into<String>,
        station: impl Into<String>,
        images: Vec<ImageRecord>,
        now: DateTime<Utc>,
    ) -> Self {
        let file_count = images.len();
        Self {
            chassis_id: chassis_id.into(),
            images,
            timestamp: now,
            display_date: display_date(now),
            file_count,
            station: station.into(),
        }
    }

    pub fn total_size(&self) -> u64 {
        self.images.iter().map(|i| i.size).sum()
    }
}

/// Render an instant the way the station's clock shows it, e.g. `3/14/2025, 9:05:12 AM`.
pub fn display_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
}

/// Human-readable byte size: `0 Bytes`, `512 Bytes`, `1.5 KB`, `2 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{} {}", rounded as u64, UNITS[unit])
    } else {
        format!("{:.1} {}", rounded, UNITS[unit])
    }
}
