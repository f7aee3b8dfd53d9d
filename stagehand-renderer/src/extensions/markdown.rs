//! `markdown` filter.
//!
//! ```text
//! {{ post.body | markdown }}
//! {% filter markdown %}
//! # Heading
//! {% endfilter %}
//! ```

use std::collections::HashMap;

use pulldown_cmark::{html, Options, Parser};
use tera::{Tera, Value};

use super::{Extension, ExtensionContext};

/// Registers the `markdown` filter.
pub struct MarkdownExtension;

impl Extension for MarkdownExtension {
    fn id(&self) -> &str {
        "markdown"
    }

    fn register(&self, tera: &mut Tera, _cx: &ExtensionContext) {
        tera.register_filter("markdown", MarkdownFilter);
    }
}

struct MarkdownFilter;

impl tera::Filter for MarkdownFilter {
    fn filter(&self, value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
        let source = tera::try_get_value!("markdown", "value", String, value);
        Ok(Value::String(render_markdown(&source)))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

/// Markdown to HTML with tables and strikethrough enabled.
pub fn render_markdown(source: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(source, options);
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
