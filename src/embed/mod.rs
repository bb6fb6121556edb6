//! Embedded static resources.
//!
//! The hot-reload script is seeded into the source static directory on first
//! run, so it ships with the copied assets of every dev build. Production
//! builds overwrite the served copy with a no-op stub.

use std::{fs, io, path::Path};

/// File name of the hot-reload script inside `static/`.
pub const HOTRELOAD_FILE: &str = "hot-reload.js";

/// Browser-side polling script driving live reload.
///
/// Polls the build manifest every 1.5s and forces a full page reload when
/// the served timestamp is fresh (within one polling window of now).
pub const HOTRELOAD_JS: &str = include_str!("hotreload.js");

/// Replacement script for production builds.
pub const HOTRELOAD_NOOP_JS: &str = "// hot reload disabled in production builds\n";

/// Overwrite the served hot-reload script with the production no-op.
///
/// Call after a production build; the polling client becomes inert.
pub fn disable_hot_reload(output_dir: &Path) -> io::Result<()> {
    let static_dir = output_dir.join("static");
    fs::create_dir_all(&static_dir)?;
    fs::write(static_dir.join(HOTRELOAD_FILE), HOTRELOAD_NOOP_JS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_hotreload_script_polls_manifest() {
        assert!(HOTRELOAD_JS.contains("last-update-date.json"));
        assert!(HOTRELOAD_JS.contains("1500"));
        assert!(HOTRELOAD_JS.contains("1501"));
    }

    #[test]
    fn test_disable_hot_reload_writes_noop() {
        let temp = TempDir::new().unwrap();
        disable_hot_reload(temp.path()).unwrap();

        let script = fs::read_to_string(temp.path().join("static").join(HOTRELOAD_FILE)).unwrap();
        assert!(script.starts_with("//"));
        assert!(!script.contains("fetch"));
    }
}
