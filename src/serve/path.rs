//! URL to filesystem path resolution.

use std::path::{Path, PathBuf};

/// Resolve a request URL to a file under `serve_root`.
///
/// Directories resolve to their `index.html`. Anything escaping the serve
/// root is rejected, whether spelled directly, percent-encoded, or routed
/// through a symlink.
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let relative = normalize_url(url);
    if relative.split('/').any(|segment| segment == "..") {
        return None;
    }

    // Canonicalize both sides so symlinks cannot escape containment.
    let root = serve_root.canonicalize().ok()?;
    let target = root.join(relative).canonicalize().ok()?;
    if !target.starts_with(&root) {
        return None;
    }

    let file = if target.is_dir() {
        target.join("index.html")
    } else {
        target
    };
    file.is_file().then_some(file)
}

/// Strip the query string, then percent-decode and trim slashes.
///
/// The query split happens before decoding: an encoded `?` belongs to the
/// file name, only a literal one starts the query string.
fn normalize_url(url: &str) -> String {
    let path = url.split('?').next().unwrap_or(url);
    percent_encoding::percent_decode_str(path)
        .decode_utf8_lossy()
        .trim_matches('/')
        .to_string()
}
