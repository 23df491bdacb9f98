//! Validation modules
//!
//! Submission checks run in a fixed order before any network or storage action; see
//! [`submission`]. File naming helpers are shared by uploads and downloads.

pub mod files;
pub mod submission;

pub use files::{extension_for_mime, mime_for_path, normalize_mime_type, sanitize_filename};
pub use submission::{
    check_content_types, check_duplicate, check_file_sizes, check_files_selected,
    validate_chassis_id, CHASSIS_ID_LENGTH,
};
