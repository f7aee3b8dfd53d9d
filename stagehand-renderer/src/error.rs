//! Error types for stagehand-renderer.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// All errors that can arise while building the environment or rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error (syntax, render-time, filter failures).
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// The engine has no template under this name.
    #[error("template not found: {name}")]
    TemplateNotFound { name: String },

    /// This template could not be read, translated or compiled. Other
    /// templates in the environment are unaffected.
    #[error("template '{name}' cannot be compiled: {source}")]
    Compile {
        name: String,
        #[source]
        source: Arc<RenderError>,
    },

    /// Filesystem error while discovering templates.
    #[error("template io error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    /// An extension identifier named in settings is not registered.
    #[error("unknown extension '{0}'")]
    UnknownExtension(String),

    /// The HTML shorthand translator rejected a template.
    #[error("{name}:{line}: {message}")]
    Hamlish {
        name: String,
        line: usize,
        message: String,
    },

    /// JSON error while building the engine context.
    #[error("context serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}
