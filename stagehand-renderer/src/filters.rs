//! Custom Tera filters.

use std::collections::{BTreeMap, HashMap};

use tera::Value;
use url::form_urlencoded;

/// `{{ request_url | update_querystring(page=2, sort="") }}`
///
/// Replaces or adds query parameters; a null or empty-string value removes
/// the parameter. The fragment, if any, is kept.
pub struct UpdateQuerystring;

impl tera::Filter for UpdateQuerystring {
    fn filter(&self, value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let url = value.as_str().ok_or_else(|| {
            tera::Error::msg("Filter `update_querystring` was used on a value that isn't a string")
        })?;
        let updates: BTreeMap<&str, &Value> = args.iter().map(|(k, v)| (k.as_str(), v)).collect();
        Ok(Value::String(update_querystring(url, &updates)))
    }
}

/// Apply `updates` to the query string of `url`.
pub fn update_querystring(url: &str, updates: &BTreeMap<&str, &Value>) -> String {
    let (before_fragment, fragment) = match url.split_once('#') {
        Some((head, frag)) => (head, Some(frag)),
        None => (url, None),
    };
    let (path, query) = before_fragment
        .split_once('?')
        .unwrap_or((before_fragment, ""));

    let mut pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();

    for (key, value) in updates {
        let position = pairs.iter().position(|(k, _)| k == key);
        pairs.retain(|(k, _)| k != key);
        let Some(text) = query_value(value) else {
            continue;
        };
        let entry = ((*key).to_string(), text);
        match position {
            Some(index) => pairs.insert(index.min(pairs.len()), entry),
            None => pairs.push(entry),
        }
    }

    let mut out = path.to_string();
    if !pairs.is_empty() {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs.iter())
            .finish();
        out.push('?');
        out.push_str(&encoded);
    }
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
