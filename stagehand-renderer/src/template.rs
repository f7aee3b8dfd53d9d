//! Compiled template handle and the host-facing render path.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use stagehand_core::Context;

use crate::engine::Environment;
use crate::error::RenderError;
use crate::signals::{Origin, TemplateRendered};

/// A compiled template owned by an [`Environment`].
///
/// Cheap to clone; all clones render through the same engine.
#[derive(Clone)]
pub struct Template {
    env: Arc<Environment>,
    name: String,
    path: PathBuf,
}

impl Template {
    pub(crate) fn new(env: Arc<Environment>, name: String, path: PathBuf) -> Self {
        Self { env, name, path }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved source file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn origin(&self) -> Origin {
        Origin::new(&self.name, &self.path)
    }

    /// Whether the output of this template is autoescaped.
    pub fn autoescape(&self) -> bool {
        self.env.autoescape().applies(Some(&self.name))
    }

    pub fn environment(&self) -> &Arc<Environment> {
        &self.env
    }

    /// Render against the host's layered `context`.
    ///
    /// Layers are flattened outer-to-inner on top of the environment
    /// globals. With `template_debug` on, one `template_rendered`
    /// notification goes out before rendering.
    pub fn render(&self, context: &Context) -> Result<String, RenderError> {
        if self.env.debug() {
            let origin = self.origin();
            tracing::debug!(template = %self.name, origin = %origin, "rendering template");
            self.env.template_rendered().send(&TemplateRendered {
                template: self,
                origin: &origin,
                context,
            });
        }
        self.env.render_flat(&self.name, context)
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish()
    }
}
