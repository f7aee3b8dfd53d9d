//! # stagehand-renderer
//!
//! Tera-backed template loader for hosts that speak the
//! [`stagehand_core::Loader`] contract.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use stagehand_core::{Context, Loader, Settings};
//! use stagehand_renderer::TemplateLoader;
//!
//! fn page(settings: &Settings) -> Result<String, Box<dyn std::error::Error>> {
//!     let loader = TemplateLoader::from_settings(settings)?;
//!     let (template, _path) = loader.load_template("index.html", None)?;
//!     let mut context = Context::new();
//!     context.insert("title", "Welcome");
//!     Ok(template.render(&context)?)
//! }
//! ```

pub mod assets;
pub mod autoescape;
pub mod context;
pub mod engine;
pub mod error;
pub mod extensions;
pub mod filters;
pub mod loader;
pub mod signals;
pub mod template;

use std::sync::Arc;

use stagehand_core::Settings;

pub use assets::AssetsEnvironment;
pub use autoescape::{guess_autoescape, AutoescapePolicy};
pub use engine::Environment;
pub use error::RenderError;
pub use extensions::{Extension, ExtensionContext, ExtensionRegistry};
pub use loader::TemplateLoader;
pub use signals::{Origin, TemplateRendered, TemplateRenderedSignal};
pub use template::Template;

/// Build the process's template environment from `settings`.
pub fn init(settings: &Settings) -> Result<Arc<Environment>, RenderError> {
    Environment::from_settings(settings)
}
