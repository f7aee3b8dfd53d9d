//! The loader contract hosts use to obtain templates by logical name.

use std::path::PathBuf;

use crate::error::LoaderError;

/// Resolves a logical template name to a compiled template and its source path.
pub trait Loader {
    /// The compiled, renderable template handed back to the host.
    type Template;

    /// Whether this loader can be used in the current process.
    fn is_usable(&self) -> bool {
        true
    }

    /// Find and load `name`.
    ///
    /// `dirs` lets the host suggest extra search directories; loaders are
    /// free to ignore it. A missing template must be reported as
    /// [`LoaderError::TemplateDoesNotExist`] carrying `name`.
    fn load_template(
        &self,
        name: &str,
        dirs: Option<&[PathBuf]>,
    ) -> Result<(Self::Template, PathBuf), LoaderError>;
}
