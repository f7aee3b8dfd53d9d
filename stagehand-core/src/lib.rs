//! Stagehand core library: the host-side vocabulary the template adapter
//! speaks.
//!
//! - [`settings`]: YAML settings read once at startup
//! - [`context`]: layered render [`Context`]
//! - [`loader`]: the [`Loader`] contract hosts call into
//! - [`urls`]: [`UrlResolver`] contract and a route-table implementation
//! - [`error`]: [`SettingsError`], [`LoaderError`], [`NoReverseMatch`]

pub mod context;
pub mod error;
pub mod loader;
pub mod settings;
pub mod urls;

pub use context::{Context, Layer};
pub use error::{LoaderError, NoReverseMatch, SettingsError};
pub use loader::Loader;
pub use settings::Settings;
pub use urls::{UrlConf, UrlResolver};
