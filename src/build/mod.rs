//! Full-build pipeline.
//!
//! Every build is a full rebuild: the output directory is deleted and
//! recreated, static assets are copied, each page template is rendered, and
//! the manifest is written last. The directory is never observed
//! mid-transition by a served request because the dev server is paused for
//! the duration of the build.

pub mod manifest;

use std::{fs, path::PathBuf};
use thiserror::Error;

use crate::config::SiteConfig;
use crate::render::{RenderError, Renderer, TemplateEngine};
use crate::utils;
use crate::{debug, log};

/// File extension of renderable page templates.
const PAGE_EXTENSION: &str = "html";

/// A build attempt failed; the caller's retry policy handles recovery.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("template rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One-shot full-build executor over a source tree.
///
/// Side effects are confined to the output directory; the source tree is
/// never mutated.
pub struct BuildPipeline {
    templates_dir: PathBuf,
    output_dir: PathBuf,
}

impl BuildPipeline {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            templates_dir: config.templates_dir(),
            output_dir: config.output_dir(),
        }
    }

    /// Run one full build.
    ///
    /// On any failure the whole build is aborted and the error surfaced;
    /// there is no partial commit.
    pub fn build(&self) -> Result<(), BuildError> {
        let engine = TemplateEngine::new(&self.templates_dir);
        self.build_with(&engine)
    }

    /// Run one full build with the given renderer.
    pub fn build_with(&self, renderer: &dyn Renderer) -> Result<(), BuildError> {
        log!("build"; "building site");

        if self.output_dir.is_dir() {
            fs::remove_dir_all(&self.output_dir)?;
        }
        fs::create_dir_all(&self.output_dir)?;

        // Static assets, verbatim. An absent or empty static source still
        // yields a static subpath in the output.
        let static_out = self.output_dir.join("static");
        let static_src = self.templates_dir.join("static");
        if static_src.is_dir() {
            utils::fs::copy_dir_all(&static_src, &static_out)?;
        }
        if !static_out.is_dir() {
            fs::create_dir_all(&static_out)?;
        }

        for name in self.page_names()? {
            debug!("build"; "rendering {name}");
            let bytes = renderer.render(&name)?;
            fs::write(self.output_dir.join(&name), bytes)?;
        }

        // Manifest last: its timestamp is >= every file it accompanies.
        manifest::write(&self.output_dir)?;

        Ok(())
    }

    /// Page template file names, filtered by extension.
    fn page_names(&self) -> Result<Vec<String>, BuildError> {
        let pages_dir = self.templates_dir.join("pages");
        let mut names = Vec::new();
        for entry in fs::read_dir(&pages_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(PAGE_EXTENSION)
                && let Some(name) = path.file_name().and_then(|n| n.to_str())
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::init::SOURCE_DIRS;
    use tempfile::TempDir;

    fn site(pages: &[(&str, &str)]) -> (TempDir, BuildPipeline) {
        let temp = TempDir::new().unwrap();
        let templates = temp.path().join("templates");
        for dir in SOURCE_DIRS {
            fs::create_dir_all(templates.join(dir)).unwrap();
        }
        fs::write(templates.join("static/style.css"), "body {}").unwrap();
        for (name, content) in pages {
            fs::write(templates.join("pages").join(name), content).unwrap();
        }

        let config = SiteConfig {
            root: temp.path().to_path_buf(),
            ..SiteConfig::default()
        };
        let pipeline = BuildPipeline::new(&config);
        (temp, pipeline)
    }

    #[test]
    fn test_build_produces_pages_static_and_manifest() {
        let (temp, pipeline) = site(&[
            ("index.html", "<h1>index</h1>"),
            ("about.html", "<h1>about</h1>"),
        ]);

        let before = manifest::now_millis();
        pipeline.build().unwrap();

        let dist = temp.path().join("dist");
        assert_eq!(
            fs::read_to_string(dist.join("index.html")).unwrap(),
            "<h1>index</h1>"
        );
        assert_eq!(
            fs::read_to_string(dist.join("about.html")).unwrap(),
            "<h1>about</h1>"
        );
        assert_eq!(
            fs::read_to_string(dist.join("static/style.css")).unwrap(),
            "body {}"
        );

        // Manifest timestamp within 1s of the build invocation.
        let manifest = manifest::read(&dist).unwrap();
        assert!(manifest.timestamp >= before);
        assert!(manifest.timestamp <= before + 1000);
    }

    #[test]
    fn test_rebuild_is_idempotent_except_manifest() {
        let (temp, pipeline) = site(&[("index.html", "{% include \"nav.html\" %}")]);
        fs::write(
            temp.path().join("templates/partials/nav.html"),
            "<nav></nav>",
        )
        .unwrap();
        let dist = temp.path().join("dist");

        pipeline.build().unwrap();
        let first_page = fs::read_to_string(dist.join("index.html")).unwrap();
        let first_manifest = manifest::read(&dist).unwrap();

        pipeline.build().unwrap();
        let second_page = fs::read_to_string(dist.join("index.html")).unwrap();
        let second_manifest = manifest::read(&dist).unwrap();

        assert_eq!(first_page, second_page);
        assert!(second_manifest.timestamp >= first_manifest.timestamp);
    }

    #[test]
    fn test_render_failure_aborts_build() {
        let (temp, pipeline) = site(&[
            ("broken.html", "{% include %}"),
            ("good.html", "fine"),
        ]);

        let err = pipeline.build().unwrap_err();
        assert!(matches!(err, BuildError::Render(_)));

        // No manifest: the build never completed.
        assert!(manifest::read(&temp.path().join("dist")).is_none());
    }

    #[test]
    fn test_stale_output_is_removed() {
        let (temp, pipeline) = site(&[("index.html", "x")]);
        let dist = temp.path().join("dist");
        fs::create_dir_all(&dist).unwrap();
        fs::write(dist.join("stale.html"), "old").unwrap();

        pipeline.build().unwrap();

        assert!(!dist.join("stale.html").exists());
        assert!(dist.join("index.html").is_file());
    }

    #[test]
    fn test_non_page_files_are_ignored() {
        let (temp, pipeline) = site(&[("index.html", "x")]);
        fs::write(temp.path().join("templates/pages/notes.txt"), "notes").unwrap();

        pipeline.build().unwrap();

        assert!(!temp.path().join("dist/notes.txt").exists());
    }

    #[test]
    fn test_source_tree_is_not_mutated() {
        let (temp, pipeline) = site(&[("index.html", "x")]);

        pipeline.build().unwrap();

        let pages: Vec<_> = fs::read_dir(temp.path().join("templates/pages"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(pages.len(), 1);
    }
}
