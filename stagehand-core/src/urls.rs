//! URL reversal.
//!
//! Templates call `url_for(name="blog:detail", args=[2024, "hello"])`; the
//! renderer forwards to whatever [`UrlResolver`] the host supplied. [`UrlConf`]
//! is a route table with `<name>` / `<converter:name>` placeholders:
//!
//! ```text
//! blog:detail  ->  /blog/<int:year>/<slug>/
//! ```

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::NoReverseMatch;

/// Turns a route name plus arguments into a URL path.
pub trait UrlResolver: Send + Sync {
    /// Reverse `name` using either positional `args` or keyword `kwargs`.
    fn reverse(
        &self,
        name: &str,
        args: &[Value],
        kwargs: &Map<String, Value>,
    ) -> Result<String, NoReverseMatch>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param {
        name: String,
        converter: Option<String>,
    },
}

/// Route table resolver.
#[derive(Debug, Clone, Default)]
pub struct UrlConf {
    routes: BTreeMap<String, Vec<Segment>>,
}

impl UrlConf {
    pub fn new(routes: BTreeMap<String, String>) -> Self {
        let routes = routes
            .into_iter()
            .map(|(name, pattern)| (name, parse_pattern(&pattern)))
            .collect();
        Self { routes }
    }

    pub fn route_names(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }
}

impl UrlResolver for UrlConf {
    fn reverse(
        &self,
        name: &str,
        args: &[Value],
        kwargs: &Map<String, Value>,
    ) -> Result<String, NoReverseMatch> {
        let segments = self
            .routes
            .get(name)
            .ok_or_else(|| NoReverseMatch::UnknownRoute(name.to_string()))?;
        if !args.is_empty() && !kwargs.is_empty() {
            return Err(NoReverseMatch::MixedArguments(name.to_string()));
        }

        let params: Vec<(&str, Option<&str>)> = segments
            .iter()
            .filter_map(|s| match s {
                Segment::Param { name, converter } => Some((name.as_str(), converter.as_deref())),
                Segment::Literal(_) => None,
            })
            .collect();
        let given = if kwargs.is_empty() { args.len() } else { kwargs.len() };
        if kwargs.is_empty() && given != params.len() {
            return Err(NoReverseMatch::ArgumentCount {
                route: name.to_string(),
                expected: params.len(),
                given,
            });
        }

        let mut url = String::new();
        let mut positional = args.iter();
        for segment in segments {
            match segment {
                Segment::Literal(text) => url.push_str(text),
                Segment::Param { name: param, converter } => {
                    let value = if kwargs.is_empty() {
                        positional.next()
                    } else {
                        kwargs.get(param)
                    };
                    let value = value.ok_or_else(|| NoReverseMatch::MissingArgument {
                        route: name.to_string(),
                        param: param.clone(),
                    })?;
                    url.push_str(&render_argument(name, param, converter.as_deref(), value)?);
                }
            }
        }

        if !kwargs.is_empty() && kwargs.len() != params.len() {
            return Err(NoReverseMatch::ArgumentCount {
                route: name.to_string(),
                expected: params.len(),
                given,
            });
        }
        Ok(url)
    }
}

fn render_argument(
    route: &str,
    param: &str,
    converter: Option<&str>,
    value: &Value,
) -> Result<String, NoReverseMatch> {
    let invalid = || NoReverseMatch::InvalidArgument {
        route: route.to_string(),
        param: param.to_string(),
    };
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return Err(invalid()),
    };
    if converter == Some("int") && text.parse::<i64>().is_err() {
        return Err(invalid());
    }
    Ok(text)
}

fn parse_pattern(pattern: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = pattern;
    while let Some(start) = rest.find('<') {
        let Some(len) = rest[start..].find('>') else {
            break;
        };
        if start > 0 {
            segments.push(Segment::Literal(rest[..start].to_string()));
        }
        let inner = &rest[start + 1..start + len];
        let segment = match inner.split_once(':') {
            Some((converter, name)) => Segment::Param {
                name: name.to_string(),
                converter: Some(converter.to_string()),
            },
            None => Segment::Param {
                name: inner.to_string(),
                converter: None,
            },
        };
        segments.push(segment);
        rest = &rest[start + len + 1..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest.to_string()));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn conf() -> UrlConf {
        let mut routes = BTreeMap::new();
        routes.insert("home".to_string(), "/".to_string());
        routes.insert(
            "blog:detail".to_string(),
            "/blog/<int:year>/<slug>/".to_string(),
        );
        UrlConf::new(routes)
    }

    fn kwargs(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[rstest]
    #[case::no_params("home", vec![], json!({}), "/")]
    #[case::positional("blog:detail", vec![json!(2024), json!("hello")], json!({}), "/blog/2024/hello/")]
    #[case::keyword("blog:detail", vec![], json!({"slug": "hi", "year": "1999"}), "/blog/1999/hi/")]
    fn reverse_builds_path(
        #[case] name: &str,
        #[case] args: Vec<Value>,
        #[case] kw: Value,
        #[case] expected: &str,
    ) {
        assert_eq!(conf().reverse(name, &args, &kwargs(kw)).unwrap(), expected);
    }

    #[rstest]
    #[case::unknown_route("nope", vec![], json!({}), NoReverseMatch::UnknownRoute("nope".into()))]
    #[case::wrong_positional_count(
        "blog:detail",
        vec![json!(2024)],
        json!({}),
        NoReverseMatch::ArgumentCount { route: "blog:detail".into(), expected: 2, given: 1 }
    )]
    #[case::missing_keyword(
        "blog:detail",
        vec![],
        json!({"year": 2024}),
        NoReverseMatch::MissingArgument { route: "blog:detail".into(), param: "slug".into() }
    )]
    #[case::int_converter_rejects_text(
        "blog:detail",
        vec![json!("soon"), json!("x")],
        json!({}),
        NoReverseMatch::InvalidArgument { route: "blog:detail".into(), param: "year".into() }
    )]
    #[case::mixed_arguments(
        "blog:detail",
        vec![json!(1)],
        json!({"slug": "x"}),
        NoReverseMatch::MixedArguments("blog:detail".into())
    )]
    fn reverse_rejects(
        #[case] name: &str,
        #[case] args: Vec<Value>,
        #[case] kw: Value,
        #[case] expected: NoReverseMatch,
    ) {
        assert_eq!(conf().reverse(name, &args, &kwargs(kw)).unwrap_err(), expected);
    }
}
