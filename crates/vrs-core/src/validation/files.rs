use std::path::Path;

const MAX_FILENAME_LENGTH: usize = 255;

/// Strip MIME parameters: `image/jpeg; q=1` becomes `image/jpeg`.
pub fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

/// File extension implied by a MIME type: its subtype, or `jpg` when there is none.
pub fn extension_for_mime(content_type: &str) -> String {
    let subtype = normalize_mime_type(content_type)
        .split_once('/')
        .map(|(_, sub)| sub.trim())
        .unwrap_or("");
    if subtype.is_empty() {
        "jpg".to_string()
    } else {
        subtype.to_lowercase()
    }
}

/// Guess a MIME type from a file path's extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Reduce a filename to a safe basename for writing to disk.
///
/// Directory components are dropped, anything outside `[A-Za-z0-9._-]` becomes `_`,
/// and names that collapse to nothing usable become `file`.
pub fn sanitize_filename(filename: &str) -> String {
    let filename_only = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    let sanitized: String = filename_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches('.').is_empty() || sanitized.contains("..") {
        return "file".to_string();
    }

    sanitized
}
