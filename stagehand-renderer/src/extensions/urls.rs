//! URL reversal from templates.
//!
//! ```text
//! {{ url(name="blog:detail", args=[post.year, post.slug]) }}
//! {{ url_for(name="blog:detail", year=post.year, slug=post.slug) }}
//! ```
//!
//! Keyword arguments other than `name`, `args` and `kwargs` are forwarded
//! to the resolver as route parameters.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Map;
use tera::{Tera, Value};

use stagehand_core::UrlResolver;

use super::{Extension, ExtensionContext};

/// Registers the `url` function.
pub struct UrlExtension;

impl Extension for UrlExtension {
    fn id(&self) -> &str {
        "url"
    }

    fn register(&self, tera: &mut Tera, cx: &ExtensionContext) {
        tera.register_function("url", ReverseUrl::new("url", Arc::clone(&cx.resolver)));
    }
}

/// Tera function forwarding to a [`UrlResolver`].
pub struct ReverseUrl {
    function: &'static str,
    resolver: Arc<dyn UrlResolver>,
}

impl ReverseUrl {
    pub fn new(function: &'static str, resolver: Arc<dyn UrlResolver>) -> Self {
        Self { function, resolver }
    }
}

impl tera::Function for ReverseUrl {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let name = args.get("name").and_then(Value::as_str).ok_or_else(|| {
            tera::Error::msg(format!(
                "Function `{}` requires a string `name` argument",
                self.function
            ))
        })?;

        let positional = match args.get("args") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            Some(single) => vec![single.clone()],
        };

        let mut kwargs = match args.get("kwargs") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => {
                return Err(tera::Error::msg(format!(
                    "Function `{}` expects `kwargs` to be an object",
                    self.function
                )))
            }
        };
        for (key, value) in args {
            if !matches!(key.as_str(), "name" | "args" | "kwargs") {
                kwargs.insert(key.clone(), value.clone());
            }
        }

        self.resolver
            .reverse(name, &positional, &kwargs)
            .map(Value::String)
            .map_err(|e| {
                tera::Error::chain(format!("Function `{}` could not reverse '{name}'", self.function), e)
            })
    }
}
