//! Normalizes raw model text into a [`CodeBundle`].
//!
//! Model output format is not guaranteed, so decoding is an ordered list of
//! attempts where the first one to produce something wins. Whatever the
//! attempts leave unrecovered is filled with marked placeholder content, so
//! [`extract`] never fails.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::wire::{CodeBundle, ExtractionSource};

pub const HTML_PLACEHOLDER_NOTICE: &str =
    "<!-- Could not extract HTML from the model response. The raw response is shown below. -->";
pub const CSS_PLACEHOLDER: &str = "/* Could not extract CSS from the model response. */";
pub const JS_PLACEHOLDER: &str = "// Could not extract JavaScript from the model response.";

/// A bundle plus how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub bundle: CodeBundle,
    pub source: ExtractionSource,
    /// Number of fields filled with placeholder content.
    pub placeholders: usize,
}

/// Per-field result of a decode attempt; `None` means "not recovered".
#[derive(Debug, Default)]
struct Partial {
    html: Option<String>,
    css: Option<String>,
    js: Option<String>,
}

impl Partial {
    fn any(&self) -> bool {
        self.html.is_some() || self.css.is_some() || self.js.is_some()
    }
}

type Attempt = fn(&str) -> Option<Partial>;

const ATTEMPTS: &[(ExtractionSource, Attempt)] = &[
    (ExtractionSource::Structured, structured),
    (ExtractionSource::DoubleEncoded, double_encoded),
    (ExtractionSource::Fenced, fenced),
    (ExtractionSource::EmbeddedObject, embedded_object),
];

pub fn extract(raw: &str) -> CodeBundle {
    extract_with_source(raw).bundle
}

pub fn extract_with_source(raw: &str) -> Extraction {
    let (source, partial) = ATTEMPTS
        .iter()
        .find_map(|(source, attempt)| attempt(raw).map(|p| (*source, p)))
        .unwrap_or((ExtractionSource::Placeholder, Partial::default()));

    let mut placeholders = 0;
    let mut fill = |field: Option<String>, placeholder: &dyn Fn() -> String| {
        field.unwrap_or_else(|| {
            placeholders += 1;
            placeholder()
        })
    };
    let bundle = CodeBundle {
        html: fill(partial.html, &|| format!("{HTML_PLACEHOLDER_NOTICE}\n{raw}")),
        css: fill(partial.css, &|| CSS_PLACEHOLDER.to_string()),
        js: fill(partial.js, &|| JS_PLACEHOLDER.to_string()),
    };

    if placeholders > 0 {
        warn!(?source, placeholders, raw_bytes = raw.len(), "extraction incomplete");
    } else {
        debug!(?source, "extracted bundle");
    }

    Extraction { bundle, source, placeholders }
}

/// The whole text is one JSON object carrying `html`, `css` and `js`.
fn structured(raw: &str) -> Option<Partial> {
    match serde_json::from_str::<Value>(raw.trim()).ok()? {
        Value::Object(map) => from_object(&map),
        _ => None,
    }
}

/// The whole text is a JSON string literal wrapping such an object.
fn double_encoded(raw: &str) -> Option<Partial> {
    let inner = serde_json::from_str::<String>(raw.trim()).ok()?;
    structured(&inner)
}

/// Labeled fences, each searched independently of the others.
fn fenced(raw: &str) -> Option<Partial> {
    let [html, css, js] = fence_patterns();
    let grab = |re: &Regex| re.captures(raw).map(|c| c[1].trim().to_string());
    let partial = Partial { html: grab(html), css: grab(css), js: grab(js) };
    partial.any().then_some(partial)
}

/// The first balanced `{...}` in the text that carries all three keys. Every
/// `{` is a candidate start, so an unmatched brace in the prose before the
/// object does not hide it.
fn embedded_object(raw: &str) -> Option<Partial> {
    raw.match_indices('{')
        .filter_map(|(i, _)| balanced_object(&raw[i..]))
        .find_map(structured)
}

fn from_object(map: &Map<String, Value>) -> Option<Partial> {
    Some(Partial {
        html: Some(field_text(map.get("html")?)),
        css: Some(field_text(map.get("css")?)),
        js: Some(field_text(map.get("js")?)),
    })
}

/// Falsy values become the empty string; other non-strings keep their JSON
/// text.
fn field_text(v: &Value) -> String {
    match v {
        Value::Null | Value::Bool(false) => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) if n.as_f64() == Some(0.0) => String::new(),
        other => other.to_string(),
    }
}

fn fence_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let fence = |label: &str| {
            Regex::new(&format!(r"(?is)```[ \t]*(?:{label})\b(.*?)```"))
                .unwrap_or_else(|e| panic!("invalid fence pattern for {label}: {e}"))
        };
        [fence("html"), fence("css"), fence("javascript|js")]
    })
}

/// `s` starts with `{`; returns the object up to its matching `}`, or `None`
/// if the text ends first. Braces inside string literals are ignored.
fn balanced_object(s: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in s.bytes().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}
