//! Error types for stagehand-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading the settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("cannot read settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error, including missing required keys.
    #[error("failed to parse settings at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Failure kinds of the host loader contract.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// No template with this name exists on any search path.
    #[error("template does not exist: {name}")]
    TemplateDoesNotExist { name: String },

    /// Any other failure from the underlying engine, passed through as-is.
    #[error("template engine error: {0}")]
    Engine(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl LoaderError {
    /// Name of the missing template, if this is a not-found failure.
    pub fn missing_name(&self) -> Option<&str> {
        match self {
            LoaderError::TemplateDoesNotExist { name } => Some(name),
            LoaderError::Engine(_) => None,
        }
    }
}

/// A route could not be reversed into a URL.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NoReverseMatch {
    #[error("no route named '{0}'")]
    UnknownRoute(String),

    #[error("route '{route}' is missing argument '{param}'")]
    MissingArgument { route: String, param: String },

    #[error("route '{route}' expects {expected} argument(s), got {given}")]
    ArgumentCount {
        route: String,
        expected: usize,
        given: usize,
    },

    #[error("route '{0}' cannot mix positional and keyword arguments")]
    MixedArguments(String),

    #[error("argument '{param}' of route '{route}' must be a string or number")]
    InvalidArgument { route: String, param: String },
}
