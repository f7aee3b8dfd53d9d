//! Asset environment: public URLs for files under the assets root.
//!
//! `{{ asset_url(path="css/site.css") }}` renders `/assets/css/site.css?v=1a2b3c4d`
//! where the version is the first eight hex digits of the file's SHA-256.
//! Files missing from the root get no version suffix.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tera::Value;

const VERSION_LEN: usize = 8;

/// Filesystem root plus the URL prefix it is served under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetsEnvironment {
    root: PathBuf,
    url: String,
}

impl AssetsEnvironment {
    pub fn new(root: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            url: url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Public URL of `path`, versioned when the file exists.
    pub fn url_for(&self, path: &str) -> String {
        let relative = path.trim_start_matches('/');
        let mut url = format!("{}/{}", self.url.trim_end_matches('/'), relative);
        if let Some(version) = self.version(relative) {
            url.push_str("?v=");
            url.push_str(&version);
        }
        url
    }

    fn version(&self, relative: &str) -> Option<String> {
        let full = self.root.join(relative);
        let bytes = match std::fs::read(&full) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::debug!(path = %full.display(), error = %err, "asset not versioned");
                return None;
            }
        };
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let mut digest = hex::encode(hasher.finalize());
        digest.truncate(VERSION_LEN);
        Some(digest)
    }
}

/// Tera function `asset_url(path=...)`.
pub(crate) struct AssetUrl(pub(crate) Arc<AssetsEnvironment>);

impl tera::Function for AssetUrl {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let path = args
            .get("path")
            .and_then(Value::as_str)
            .ok_or_else(|| tera::Error::msg("Function `asset_url` requires a string `path` argument"))?;
        Ok(Value::String(self.0.url_for(path)))
    }
}
