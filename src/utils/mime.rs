//! MIME type detection from file extensions.

use std::path::Path;

/// Common content type constants.
pub mod types {
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const JSON: &str = "application/json";
    pub const JAVASCRIPT: &str = "text/javascript";
    pub const CSS: &str = "text/css";
    pub const OCTET_STREAM: &str = "application/octet-stream";
}

/// Content type for a file path, by extension.
pub fn from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "html" | "htm" => types::HTML,
        "txt" => types::PLAIN,
        "json" => types::JSON,
        "js" | "mjs" => types::JAVASCRIPT,
        "css" => types::CSS,
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "pdf" => "application/pdf",
        "xml" => "application/xml",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "wasm" => "application/wasm",
        _ => types::OCTET_STREAM,
    }
}
