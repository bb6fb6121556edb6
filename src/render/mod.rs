//! Template rendering seam.
//!
//! The build pipeline treats rendering as an opaque `render(name) -> bytes`
//! operation behind the [`Renderer`] trait. The default implementation is
//! backed by minijinja with a loader searching the four source
//! subdirectories, so pages can `{% include %}` partials and
//! `{% extends %}` layouts by bare file name.

use minijinja::Environment;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::cli::init::SOURCE_DIRS;

/// Rendering failed for a template (syntax error, missing include, ...).
#[derive(Debug, Error)]
#[error(transparent)]
pub struct RenderError(#[from] minijinja::Error);

/// Opaque page renderer consumed by the build pipeline.
pub trait Renderer {
    /// Render the named page template to output bytes.
    fn render(&self, name: &str) -> Result<Vec<u8>, RenderError>;
}

/// minijinja-backed template engine over a source tree.
///
/// Rebuilt for every build so template edits are always picked up; the
/// environment caches template sources internally otherwise.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create an engine resolving template names against
    /// `<templates_dir>/{pages,partials,layouts,static}` in order.
    pub fn new(templates_dir: &Path) -> Self {
        let roots: Vec<PathBuf> = SOURCE_DIRS.iter().map(|d| templates_dir.join(d)).collect();

        let mut env = Environment::new();
        env.set_loader(move |name| {
            // Template names are bare file names; anything path-like is
            // not a template of ours.
            if name.contains("..") || name.contains('/') || name.contains('\\') {
                return Ok(None);
            }
            for root in &roots {
                let path = root.join(name);
                if path.is_file() {
                    return match std::fs::read_to_string(&path) {
                        Ok(source) => Ok(Some(source)),
                        Err(e) => Err(minijinja::Error::new(
                            minijinja::ErrorKind::InvalidOperation,
                            format!("failed to read '{}': {e}", path.display()),
                        )),
                    };
                }
            }
            Ok(None)
        });

        Self { env }
    }
}

impl Renderer for TemplateEngine {
    fn render(&self, name: &str) -> Result<Vec<u8>, RenderError> {
        let template = self.env.get_template(name)?;
        let output = template.render(minijinja::context! {})?;
        Ok(output.into_bytes())
    }
}
