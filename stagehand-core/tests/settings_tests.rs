//! Settings file loading: path rebasing and error reporting.

use std::path::PathBuf;

use assert_fs::prelude::*;
use predicates::prelude::*;
use stagehand_core::{Settings, SettingsError};

const SITE: &str = "\
template_dirs:
  - templates
  - /srv/shared/templates
extensions: [acme.pagination]
assets_root: static
assets_url: /assets/
media_url: /media/
static_url: /static/
template_autoescape: false
template_debug: true
urls:
  home: /
  \"blog:detail\": /blog/<int:year>/<slug>/
";

#[test]
fn load_rebases_relative_paths_on_settings_dir() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("site.yaml");
    file.write_str(SITE).expect("write");

    let settings = Settings::load(file.path()).expect("load");
    assert_eq!(
        settings.template_dirs,
        vec![
            dir.path().join("templates"),
            PathBuf::from("/srv/shared/templates"),
        ]
    );
    assert_eq!(settings.assets_root, dir.path().join("static"));
    assert_eq!(settings.extensions, vec!["acme.pagination".to_string()]);
    assert!(!settings.template_autoescape);
    assert!(settings.template_debug);
    assert_eq!(settings.urls.len(), 2);
    assert_eq!(settings.urls["blog:detail"], "/blog/<int:year>/<slug>/");
}

#[test]
fn missing_file_reports_io_error_with_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let path = dir.path().join("absent.yaml");
    let err = Settings::load(&path).unwrap_err();
    assert!(matches!(err, SettingsError::Io { .. }), "got: {err}");
    assert!(predicate::str::contains("absent.yaml").eval(&err.to_string()));
}

#[test]
fn malformed_yaml_reports_parse_error_with_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("broken.yaml");
    file.write_str("- just\n- a list\n").expect("write");

    let err = Settings::load(file.path()).unwrap_err();
    assert!(matches!(err, SettingsError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("broken.yaml"));
}
