//! Extension-based content type helpers.

/// Fallback for unknown extensions.
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Lowercase extension after the last dot, or `""` when there is none or the
/// name starts with its only dot.
pub fn extension_of(filename: &str) -> String {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => filename[idx + 1..].to_lowercase(),
        _ => String::new(),
    }
}

/// MIME type for an extension (without the dot).
pub fn mime_from_extension(extension: &str) -> &'static str {
    match extension.to_lowercase().as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "txt" => "text/plain",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "zip" => "application/zip",
        "rar" => "application/x-rar-compressed",
        _ => DEFAULT_MIME,
    }
}

/// MIME type guessed from a file name or path.
pub fn mime_from_path(path: &str) -> &'static str {
    mime_from_extension(&extension_of(path))
}

/// Whether files with this extension can be rendered inline.
pub fn is_previewable(extension: &str) -> bool {
    matches!(
        extension.to_lowercase().as_str(),
        "pdf"
            | "jpg"
            | "jpeg"
            | "png"
            | "gif"
            | "webp"
            | "svg"
            | "txt"
            | "md"
            | "json"
            | "xml"
            | "html"
            | "css"
            | "js"
    )
}
