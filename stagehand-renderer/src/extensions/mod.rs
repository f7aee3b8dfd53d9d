//! Extension plugins.
//!
//! An [`Extension`] adds functions, filters or a source preprocessor to the
//! engine. Extensions are looked up by identifier in an
//! [`ExtensionRegistry`]; the environment always applies the built-ins
//! (`url`, `csrf_token`, `markdown`, `hamlish`) first, then the identifiers
//! listed in settings, in order.

use std::collections::BTreeMap;
use std::sync::Arc;

use tera::Tera;

use stagehand_core::UrlResolver;

use crate::error::RenderError;

pub mod csrf;
pub mod hamlish;
pub mod markdown;
pub mod urls;

pub use csrf::CsrfTokenExtension;
pub use hamlish::HamlishExtension;
pub use markdown::MarkdownExtension;
pub use urls::{ReverseUrl, UrlExtension};

/// Built-in extension identifiers, in application order.
pub const BUILTIN_EXTENSIONS: &[&str] = &["url", "csrf_token", "markdown", "hamlish"];

/// Services extensions may need while registering.
#[derive(Clone)]
pub struct ExtensionContext {
    pub resolver: Arc<dyn UrlResolver>,
}

/// A pluggable unit of template functionality.
pub trait Extension: Send + Sync {
    /// Identifier used in settings.
    fn id(&self) -> &str;

    /// Register functions and filters on the engine.
    fn register(&self, tera: &mut Tera, cx: &ExtensionContext);

    /// Rewrite a template's source before compilation.
    ///
    /// `Ok(None)` leaves the source untouched.
    fn preprocess(&self, _name: &str, _source: &str) -> Result<Option<String>, RenderError> {
        Ok(None)
    }
}

/// Typed registry from identifier to extension.
#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    entries: BTreeMap<String, Arc<dyn Extension>>,
}

impl ExtensionRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with the four built-in extensions.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(UrlExtension);
        registry.register(CsrfTokenExtension);
        registry.register(MarkdownExtension);
        registry.register(HamlishExtension);
        registry
    }

    /// Add `extension` under its own identifier, returning any replaced entry.
    pub fn register(
        &mut self,
        extension: impl Extension + 'static,
    ) -> Option<Arc<dyn Extension>> {
        let extension: Arc<dyn Extension> = Arc::new(extension);
        self.entries.insert(extension.id().to_string(), extension)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Look up `ids` in order. Repeated identifiers are returned once.
    pub fn resolve<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<Arc<dyn Extension>>, RenderError> {
        let mut seen: Vec<&str> = Vec::with_capacity(ids.len());
        let mut resolved = Vec::with_capacity(ids.len());
        for id in ids {
            let id = id.as_ref();
            if seen.contains(&id) {
                continue;
            }
            let extension = self
                .entries
                .get(id)
                .ok_or_else(|| RenderError::UnknownExtension(id.to_string()))?;
            seen.push(id);
            resolved.push(Arc::clone(extension));
        }
        Ok(resolved)
    }

    /// Built-ins followed by `extra`.
    pub fn resolve_with_builtins<S: AsRef<str>>(
        &self,
        extra: &[S],
    ) -> Result<Vec<Arc<dyn Extension>>, RenderError> {
        let mut ids: Vec<&str> = BUILTIN_EXTENSIONS.to_vec();
        ids.extend(extra.iter().map(|id| id.as_ref()));
        self.resolve(&ids)
    }
}
