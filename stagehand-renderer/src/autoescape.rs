//! Autoescape policy keyed on the template's file extension.

/// Extensions whose output is markup and therefore escaped.
pub const ESCAPED_EXTENSIONS: &[&str] = &["html", "htm", "xml", "haml"];

/// Whether a template named `name` should be autoescaped.
///
/// Absent names and names without a `.` are never escaped. Otherwise the
/// text after the last `.` must match [`ESCAPED_EXTENSIONS`] exactly
/// (case-sensitive).
pub fn guess_autoescape(name: Option<&str>) -> bool {
    let Some(name) = name else {
        return false;
    };
    match name.rsplit_once('.') {
        Some((_, ext)) => ESCAPED_EXTENSIONS.contains(&ext),
        None => false,
    }
}

/// [`guess_autoescape`] gated by the global `template_autoescape` switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoescapePolicy {
    enabled: bool,
}

impl AutoescapePolicy {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether `name` is escaped under this policy.
    pub fn applies(&self, name: Option<&str>) -> bool {
        self.enabled && guess_autoescape(name)
    }

    /// Suffix list in the form `Tera::autoescape_on` expects.
    ///
    /// Tera matches with `ends_with`, so `".html"` selects exactly the names
    /// whose last extension is `html`.
    pub fn tera_suffixes(&self) -> Vec<&'static str> {
        if self.enabled {
            vec![".html", ".htm", ".xml", ".haml"]
        } else {
            Vec::new()
        }
    }
}
