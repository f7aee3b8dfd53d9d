//! Indentation-based HTML shorthand for `.haml` templates.
//!
//! ```text
//! -extends "base.html"
//! -block content:
//!   %ul#nav.menu
//!     -for item in items:
//!       %li << {{ item.title }}
//!   %p.note
//!     = footer_text
//!   %br.
//! ```
//!
//! | Line form                 | Output                                       |
//! |---------------------------|----------------------------------------------|
//! | `%tag.cls#id attrs`       | `<tag id=".." class=".." attrs>`, closed on dedent |
//! | `.cls` / `#id`            | same, with an implicit `div`                 |
//! | `%tag << text`            | `<tag>text</tag>` on one line                |
//! | `%tag.` / void element    | `<tag />`                                    |
//! | `-stmt:`                  | `{% stmt %}`, `{% endstmt %}` on dedent      |
//! | `-else:` / `-elif c:`     | continues the open block at that indentation |
//! | `-stmt`                   | `{% stmt %}`                                 |
//! | `= expr`                  | `{{ expr }}`                                 |
//! | `\text`                   | `text`, verbatim                             |

use tera::Tera;

use super::{Extension, ExtensionContext};
use crate::error::RenderError;

/// File suffix the translator applies to.
pub const HAML_SUFFIX: &str = ".haml";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const CONTINUATIONS: &[&str] = &["else", "elif"];

/// Translates `.haml` sources before they reach the engine.
pub struct HamlishExtension;

impl Extension for HamlishExtension {
    fn id(&self) -> &str {
        "hamlish"
    }

    fn register(&self, _tera: &mut Tera, _cx: &ExtensionContext) {}

    fn preprocess(&self, name: &str, source: &str) -> Result<Option<String>, RenderError> {
        if !name.ends_with(HAML_SUFFIX) {
            return Ok(None);
        }
        translate(name, source).map(Some)
    }
}

struct Frame {
    indent: usize,
    pad: String,
    close: String,
    block: bool,
}

/// Translate shorthand `source` into HTML with Tera tags.
pub fn translate(name: &str, source: &str) -> Result<String, RenderError> {
    let fail = |line: usize, message: String| RenderError::Hamlish {
        name: name.to_string(),
        line,
        message,
    };

    let mut out: Vec<String> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let content = raw.trim();
        if content.is_empty() {
            continue;
        }
        let indent = raw.len() - raw.trim_start().len();
        let pad = &raw[..indent];

        if let Some(stmt) = content.strip_prefix('-') {
            let stmt = stmt.trim();
            let keyword = keyword_of(stmt);
            if CONTINUATIONS.contains(&keyword) {
                close_frames(&mut stack, &mut out, |f| f.indent > indent);
                match stack.last() {
                    Some(frame) if frame.indent == indent && frame.block => {}
                    _ => {
                        return Err(fail(
                            line,
                            format!("`-{keyword}` has no open block at this indentation"),
                        ))
                    }
                }
                out.push(format!("{pad}{{% {} %}}", strip_colon(stmt)));
                continue;
            }
        }

        close_frames(&mut stack, &mut out, |f| f.indent >= indent);

        if let Some(stmt) = content.strip_prefix('-') {
            let stmt = stmt.trim();
            if stmt.is_empty() {
                return Err(fail(line, "empty statement".to_string()));
            }
            if stmt.ends_with(':') {
                let stmt = strip_colon(stmt);
                out.push(format!("{pad}{{% {stmt} %}}"));
                stack.push(Frame {
                    indent,
                    pad: pad.to_string(),
                    close: closing_tag(stmt),
                    block: true,
                });
            } else {
                out.push(format!("{pad}{{% {stmt} %}}"));
            }
        } else if let Some(expr) = content.strip_prefix('=') {
            out.push(format!("{pad}{{{{ {} }}}}", expr.trim()));
        } else if let Some(text) = content.strip_prefix('\\') {
            out.push(format!("{pad}{text}"));
        } else if looks_like_element(content) {
            let element = parse_element(content).map_err(|message| fail(line, message))?;
            let open = element.open_tag();
            if element.self_closing() {
                if element.inline.is_some() {
                    return Err(fail(
                        line,
                        format!("<{}> cannot have content", element.tag),
                    ));
                }
                out.push(format!("{pad}{open}"));
            } else if let Some(inline) = &element.inline {
                out.push(format!("{pad}{open}{inline}</{}>", element.tag));
            } else {
                out.push(format!("{pad}{open}"));
                stack.push(Frame {
                    indent,
                    pad: pad.to_string(),
                    close: format!("</{}>", element.tag),
                    block: false,
                });
            }
        } else {
            out.push(format!("{pad}{content}"));
        }
    }

    close_frames(&mut stack, &mut out, |_| true);

    let mut html = out.join("\n");
    html.push('\n');
    Ok(html)
}

fn close_frames(stack: &mut Vec<Frame>, out: &mut Vec<String>, should_close: impl Fn(&Frame) -> bool) {
    while stack.last().is_some_and(&should_close) {
        if let Some(frame) = stack.pop() {
            out.push(format!("{}{}", frame.pad, frame.close));
        }
    }
}

fn keyword_of(stmt: &str) -> &str {
    stmt.split(|c: char| c.is_whitespace() || c == ':')
        .next()
        .unwrap_or_default()
}

fn strip_colon(stmt: &str) -> &str {
    stmt.strip_suffix(':').unwrap_or(stmt).trim_end()
}

/// `{% endblock name %}` and `{% endmacro name %}` carry the name; other
/// blocks close with a bare `{% endkeyword %}`.
fn closing_tag(stmt: &str) -> String {
    let mut words = stmt.split_whitespace();
    let keyword = words.next().unwrap_or_default();
    match keyword {
        "block" | "macro" => {
            let name = words
                .next()
                .map(|w| w.split('(').next().unwrap_or(w))
                .unwrap_or_default();
            format!("{{% end{keyword} {name} %}}")
        }
        _ => format!("{{% end{keyword} %}}"),
    }
}

fn looks_like_element(content: &str) -> bool {
    if content.starts_with('%') {
        return true;
    }
    let mut chars = content.chars();
    matches!(chars.next(), Some('.' | '#'))
        && chars
            .next()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

struct Element {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attrs: String,
    inline: Option<String>,
    explicit_close: bool,
}

impl Element {
    fn self_closing(&self) -> bool {
        self.explicit_close || VOID_ELEMENTS.contains(&self.tag.as_str())
    }

    fn open_tag(&self) -> String {
        let mut tag = format!("<{}", self.tag);
        if let Some(id) = &self.id {
            tag.push_str(&format!(" id=\"{id}\""));
        }
        if !self.classes.is_empty() {
            tag.push_str(&format!(" class=\"{}\"", self.classes.join(" ")));
        }
        if !self.attrs.is_empty() {
            tag.push(' ');
            tag.push_str(&self.attrs);
        }
        tag.push_str(if self.self_closing() { " />" } else { ">" });
        tag
    }
}

fn parse_element(content: &str) -> Result<Element, String> {
    let (head, rest) = content
        .split_once(char::is_whitespace)
        .unwrap_or((content, ""));

    let (tag, mut selectors) = match head.strip_prefix('%') {
        Some(after) => {
            let end = after.find(['.', '#']).unwrap_or(after.len());
            (&after[..end], &after[end..])
        }
        None => ("div", head),
    };
    if tag.is_empty() {
        return Err("empty tag name".to_string());
    }

    let mut element = Element {
        tag: tag.to_string(),
        id: None,
        classes: Vec::new(),
        attrs: String::new(),
        inline: None,
        explicit_close: false,
    };

    while let Some(marker) = selectors.chars().next() {
        let body = &selectors[1..];
        let end = body.find(['.', '#']).unwrap_or(body.len());
        let token = &body[..end];
        selectors = &body[end..];
        match (marker, token.is_empty()) {
            ('.', true) if selectors.is_empty() => element.explicit_close = true,
            (_, true) => return Err(format!("empty selector after '{marker}'")),
            ('.', false) => element.classes.push(token.to_string()),
            _ => element.id = Some(token.to_string()),
        }
    }

    let rest = rest.trim();
    match rest.split_once("<<") {
        Some((attrs, inline)) => {
            element.attrs = attrs.trim().to_string();
            element.inline = Some(inline.trim().to_string());
        }
        None => element.attrs = rest.to_string(),
    }
    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_elements_and_loop() {
        let source = "%ul#nav.menu\n  -for item in items:\n    %li << {{ item }}\n";
        let html = translate("nav.haml", source).unwrap();
        assert_eq!(
            html,
            "<ul id=\"nav\" class=\"menu\">\n  {% for item in items %}\n    <li>{{ item }}</li>\n  {% endfor %}\n</ul>\n"
        );
    }

    #[test]
    fn implicit_div_attributes_and_expressions() {
        let source = ".card data-kind=\"note\"\n  = title\n  \\%not a tag\n";
        let html = translate("card.haml", source).unwrap();
        assert_eq!(
            html,
            "<div class=\"card\" data-kind=\"note\">\n  {{ title }}\n  %not a tag\n</div>\n"
        );
    }

    #[test]
    fn if_else_continues_block() {
        let source = "-if user:\n  %p << hi\n-else:\n  %p << bye\n%hr\n";
        let html = translate("greet.haml", source).unwrap();
        assert_eq!(
            html,
            "{% if user %}\n  <p>hi</p>\n{% else %}\n  <p>bye</p>\n{% endif %}\n<hr />\n"
        );
    }

    #[test]
    fn block_end_tags_carry_name() {
        let source = "-extends \"base.html\"\n-block content:\n  %br.\n";
        let html = translate("page.haml", source).unwrap();
        assert_eq!(
            html,
            "{% extends \"base.html\" %}\n{% block content %}\n  <br />\n{% endblock content %}\n"
        );
    }

    #[test]
    fn macro_end_tag_drops_signature() {
        assert_eq!(closing_tag("macro field(name, value)"), "{% endmacro field %}");
    }

    #[test]
    fn plain_text_is_kept() {
        let html = translate("t.haml", "%p\n  Hello ... world\n  ...\n").unwrap();
        assert_eq!(html, "<p>\n  Hello ... world\n  ...\n</p>\n");
    }

    #[test]
    fn orphan_else_is_rejected() {
        let err = translate("bad.haml", "%p\n  -else:\n").unwrap_err();
        match err {
            RenderError::Hamlish { name, line, .. } => {
                assert_eq!(name, "bad.haml");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_tag_name_is_rejected() {
        let err = translate("bad.haml", "% oops\n").unwrap_err();
        assert!(err.to_string().contains("empty tag name"), "got: {err}");
    }

    #[test]
    fn only_haml_names_are_preprocessed() {
        let ext = HamlishExtension;
        assert!(ext.preprocess("index.html", "%p").unwrap().is_none());
        assert_eq!(ext.preprocess("index.haml", "%p").unwrap().as_deref(), Some("<p>\n</p>\n"));
    }
}
