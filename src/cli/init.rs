//! Source tree scaffolding.
//!
//! Creates the fixed source layout on first run and seeds the hot-reload
//! script into the static directory.

use anyhow::{Context, Result};
use std::fs;

use crate::config::SiteConfig;
use crate::embed;

/// Fixed subdirectories of the template source tree.
pub const SOURCE_DIRS: &[&str] = &["pages", "partials", "layouts", "static"];

/// Create the source tree structure if absent.
///
/// Also seeds `static/hot-reload.js` when missing, so the polling client
/// is copied into every build's static output.
pub fn ensure_site_structure(config: &SiteConfig) -> Result<()> {
    let templates = config.templates_dir();

    for dir in SOURCE_DIRS {
        let path = templates.join(dir);
        fs::create_dir_all(&path)
            .with_context(|| format!("failed to create directory '{}'", path.display()))?;
    }

    let hot_reload = templates.join("static").join(embed::HOTRELOAD_FILE);
    if !hot_reload.is_file() {
        fs::write(&hot_reload, embed::HOTRELOAD_JS)
            .with_context(|| format!("failed to seed '{}'", hot_reload.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_at(root: &std::path::Path) -> SiteConfig {
        SiteConfig {
            root: root.to_path_buf(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_creates_source_tree() {
        let temp = TempDir::new().unwrap();
        let config = config_at(temp.path());

        ensure_site_structure(&config).unwrap();

        for dir in SOURCE_DIRS {
            assert!(temp.path().join("templates").join(dir).is_dir());
        }
        assert!(
            temp.path()
                .join("templates/static/hot-reload.js")
                .is_file()
        );
    }

    #[test]
    fn test_keeps_existing_hot_reload_script() {
        let temp = TempDir::new().unwrap();
        let config = config_at(temp.path());

        let script = temp.path().join("templates/static/hot-reload.js");
        fs::create_dir_all(script.parent().unwrap()).unwrap();
        fs::write(&script, "// customized").unwrap();

        ensure_site_structure(&config).unwrap();

        assert_eq!(fs::read_to_string(&script).unwrap(), "// customized");
    }

    #[test]
    fn test_idempotent_on_existing_tree() {
        let temp = TempDir::new().unwrap();
        let config = config_at(temp.path());

        ensure_site_structure(&config).unwrap();
        ensure_site_structure(&config).unwrap();

        assert!(temp.path().join("templates/pages").is_dir());
    }
}
