//! Settings read once at startup.
//!
//! # File shape
//!
//! ```yaml
//! template_dirs: [templates, shared/templates]
//! extensions: [acme.pagination]
//! assets_root: static
//! assets_url: /static/
//! media_url: /media/
//! static_url: /static/
//! template_autoescape: true
//! template_debug: false
//! urls:
//!   "blog:detail": /blog/<int:year>/<slug>/
//! ```
//!
//! `extensions`, `template_debug` and `urls` are optional; every other key
//! is required. Relative paths are resolved against the directory holding
//! the settings file when loaded through [`Settings::load`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Adapter configuration. Fixed once the environment is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Template search directories, consulted in order.
    pub template_dirs: Vec<PathBuf>,

    /// Identifiers of host-supplied extensions, applied after the built-ins.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Filesystem root of the asset pipeline.
    pub assets_root: PathBuf,

    /// Public URL prefix of the asset pipeline.
    pub assets_url: String,

    /// Exposed to templates as `MEDIA_URL`.
    pub media_url: String,

    /// Exposed to templates as `STATIC_URL`.
    pub static_url: String,

    /// Global autoescape switch.
    pub template_autoescape: bool,

    /// Emit `template_rendered` notifications on every render.
    #[serde(default)]
    pub template_debug: bool,

    /// Named routes for `url_for` / `url`.
    #[serde(default)]
    pub urls: BTreeMap<String, String>,
}

impl Settings {
    /// Parse settings from a YAML string. Paths are kept as written.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load settings from `path`, resolving relative paths against its parent.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_yaml_str(&contents).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(settings.relative_to(base))
    }

    /// Rebase every relative path onto `base`.
    pub fn relative_to(mut self, base: &Path) -> Self {
        self.template_dirs = self
            .template_dirs
            .into_iter()
            .map(|dir| rebase(base, dir))
            .collect();
        self.assets_root = rebase(base, self.assets_root);
        self
    }
}

fn rebase(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const MINIMAL: &str = "\
template_dirs: [templates]
assets_root: static
assets_url: /assets/
media_url: /media/
static_url: /static/
template_autoescape: true
";

    #[test]
    fn optional_keys_default() {
        let settings = Settings::from_yaml_str(MINIMAL).expect("parse");
        assert!(settings.extensions.is_empty());
        assert!(!settings.template_debug);
        assert!(settings.urls.is_empty());
        assert_eq!(settings.template_dirs, vec![PathBuf::from("templates")]);
    }

    #[rstest]
    #[case("template_dirs")]
    #[case("assets_root")]
    #[case("assets_url")]
    #[case("media_url")]
    #[case("static_url")]
    #[case("template_autoescape")]
    fn missing_required_key_is_an_error(#[case] key: &str) {
        let yaml: String = MINIMAL
            .lines()
            .filter(|line| !line.starts_with(key))
            .map(|line| format!("{line}\n"))
            .collect();
        let err = Settings::from_yaml_str(&yaml).unwrap_err();
        assert!(err.to_string().contains(key), "got: {err}");
    }

    #[test]
    fn relative_to_keeps_absolute_paths() {
        let mut settings = Settings::from_yaml_str(MINIMAL).expect("parse");
        settings.template_dirs.push(PathBuf::from("/srv/templates"));
        let settings = settings.relative_to(Path::new("/etc/site"));
        assert_eq!(
            settings.template_dirs,
            vec![
                PathBuf::from("/etc/site/templates"),
                PathBuf::from("/srv/templates"),
            ]
        );
        assert_eq!(settings.assets_root, PathBuf::from("/etc/site/static"));
    }
}
