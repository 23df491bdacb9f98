use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;
use crate::storage_types::DuplicatePolicy;

pub const CHASSIS_ID_LENGTH: usize = 4;

static CHASSIS_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}$").expect("chassis id pattern compiles"));

/// A chassis id is exactly four ASCII digits. No trimming is applied.
pub fn validate_chassis_id(chassis_id: &str) -> Result<(), ValidationError> {
    if CHASSIS_ID_RE.is_match(chassis_id) {
        Ok(())
    } else {
        Err(ValidationError::InvalidChassisId(chassis_id.to_string()))
    }
}

pub fn check_files_selected(count: usize) -> Result<(), ValidationError> {
    if count == 0 {
        return Err(ValidationError::NoFilesSelected);
    }
    Ok(())
}

/// Reject the submission when any file is over `max_bytes`, naming how many are.
pub fn check_file_sizes<I>(sizes: I, max_bytes: usize) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = u64>,
{
    let oversized = sizes
        .into_iter()
        .filter(|size| *size > max_bytes as u64)
        .count();
    if oversized > 0 {
        return Err(ValidationError::FileTooLarge {
            count: oversized,
            limit_mb: max_bytes / (1024 * 1024),
        });
    }
    Ok(())
}

/// Every file must carry an `image/*` content type. The first offender is reported.
pub fn check_content_types<'a, I>(files: I) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    for (name, content_type) in files {
        let normalized = super::files::normalize_mime_type(content_type).to_lowercase();
        let is_image = normalized
            .strip_prefix("image/")
            .is_some_and(|subtype| !subtype.is_empty());
        if !is_image {
            return Err(ValidationError::UnsupportedFileType {
                file: name.to_string(),
                content_type: content_type.to_string(),
            });
        }
    }
    Ok(())
}

/// Apply the duplicate policy given whether the chassis id is already on record.
pub fn check_duplicate(
    chassis_id: &str,
    already_recorded: bool,
    policy: DuplicatePolicy,
) -> Result<(), ValidationError> {
    if already_recorded && policy == DuplicatePolicy::Reject {
        return Err(ValidationError::DuplicateChassisId(chassis_id.to_string()));
    }
    Ok(())
}
