//! [`Loader`] implementation over the shared [`Environment`].

use std::path::PathBuf;
use std::sync::Arc;

use stagehand_core::{Loader, LoaderError, Settings};

use crate::engine::Environment;
use crate::error::RenderError;
use crate::template::Template;

/// Hands out templates from one long-lived environment.
#[derive(Debug, Clone)]
pub struct TemplateLoader {
    env: Arc<Environment>,
}

impl TemplateLoader {
    pub fn new(env: Arc<Environment>) -> Self {
        Self { env }
    }

    /// Build the environment from `settings` and wrap it.
    pub fn from_settings(settings: &Settings) -> Result<Self, RenderError> {
        Ok(Self::new(Environment::from_settings(settings)?))
    }

    pub fn environment(&self) -> &Arc<Environment> {
        &self.env
    }
}

impl Loader for TemplateLoader {
    type Template = Template;

    /// `dirs` is ignored; search paths are fixed when the environment is built.
    fn load_template(
        &self,
        name: &str,
        _dirs: Option<&[PathBuf]>,
    ) -> Result<(Template, PathBuf), LoaderError> {
        match self.env.get_template(name) {
            Ok(template) => {
                let path = template.path().to_path_buf();
                Ok((template, path))
            }
            Err(RenderError::TemplateNotFound { .. }) => Err(LoaderError::TemplateDoesNotExist {
                name: name.to_string(),
            }),
            Err(other) => Err(LoaderError::Engine(Box::new(other))),
        }
    }
}
