//! `csrf_token`: hidden form field carrying the request's CSRF token.
//!
//! ```text
//! <form method="post">{{ csrf_token(token=csrf_token) }} ...</form>
//! ```

use std::collections::HashMap;

use tera::{Tera, Value};

use super::{Extension, ExtensionContext};

/// Placeholder hosts put in the context when no token was generated.
pub const NOT_PROVIDED: &str = "NOTPROVIDED";

/// Registers the `csrf_token` function.
pub struct CsrfTokenExtension;

impl Extension for CsrfTokenExtension {
    fn id(&self) -> &str {
        "csrf_token"
    }

    fn register(&self, tera: &mut Tera, _cx: &ExtensionContext) {
        tera.register_function("csrf_token", CsrfToken);
    }
}

struct CsrfToken;

impl tera::Function for CsrfToken {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let token = args.get("token").and_then(Value::as_str).unwrap_or_default();
        Ok(Value::String(csrf_input(token)))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

/// Markup for `token`, or an empty string when there is no usable token.
pub fn csrf_input(token: &str) -> String {
    if token.is_empty() || token == NOT_PROVIDED {
        tracing::warn!("csrf_token used in a template but no token was supplied in the context");
        return String::new();
    }
    format!(
        "<div style=\"display:none\"><input type=\"hidden\" name=\"csrfmiddlewaretoken\" value=\"{}\"></div>",
        tera::escape_html(token)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_hidden_input() {
        assert_eq!(
            csrf_input("abc123"),
            "<div style=\"display:none\"><input type=\"hidden\" name=\"csrfmiddlewaretoken\" value=\"abc123\"></div>"
        );
    }

    #[test]
    fn escapes_token() {
        assert!(csrf_input("a\"b").contains("value=\"a&quot;b\""));
    }

    #[test]
    fn missing_or_placeholder_token_renders_nothing() {
        assert_eq!(csrf_input(""), "");
        assert_eq!(csrf_input(NOT_PROVIDED), "");
    }
}
