//! Frontmatter codec: the `---` delimited `key: value` header prefixed to
//! every generated document.
//!
//! The format is deliberately flat: no nesting, no lists. Decoded values are
//! always strings; quoted values are unescaped so that anything the encoder
//! writes comes back unchanged.

use std::fmt;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

const DELIMITER: &str = "---";

const QUOTE_CHARS: [char; 6] = ['"', '\'', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}'];

static HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\A---\r?\n(?:(.*?)\r?\n)?---(?:\r?\n(.*))?\z")
        .expect("frontmatter header pattern is valid")
});

/// A single header value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Skipped by the encoder.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Int(i) => write!(f, "{i}"),
            FieldValue::Float(x) => write!(f, "{x}"),
            FieldValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<f64> for FieldValue {
    fn from(x: f64) -> Self {
        FieldValue::Float(x)
    }
}

/// Insertion-ordered header mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    entries: IndexMap<String, FieldValue>,
}

impl Frontmatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merges `other` on top of `self`: `other` wins on collisions, keys
    /// already present keep their position, new keys are appended.
    pub fn merge(&mut self, other: &Frontmatter) {
        for (k, v) in other.iter() {
            self.entries.insert(k.clone(), v.clone());
        }
    }
}

/// Result of [`decode`]. `body` borrows from the decoded text.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<'a> {
    pub header: Option<Frontmatter>,
    pub body: &'a str,
}

/// Splits a leading header from `text`. Without a header anchored at the very
/// start, returns no header and the whole text as body.
pub fn decode(text: &str) -> Decoded<'_> {
    let Some(caps) = HEADER.captures(text) else {
        return Decoded {
            header: None,
            body: text,
        };
    };

    let mut header = Frontmatter::new();
    if let Some(block) = caps.get(1) {
        for line in block.as_str().lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            header.insert(decode_key(key), unquote(value.trim()));
        }
    }

    Decoded {
        header: Some(header),
        body: caps.get(2).map_or("", |m| m.as_str()),
    }
}

/// Renders a header block: delimiter, one `key: value` line per non-null
/// entry in insertion order, delimiter. No trailing newline.
pub fn encode(header: &Frontmatter) -> String {
    let mut lines = vec![DELIMITER.to_string()];
    for (key, value) in header.iter() {
        let key = encode_key(key);
        match value {
            FieldValue::Null => continue,
            FieldValue::Str(s) if needs_quoting(s) => {
                lines.push(format!("{key}: \"{}\"", escape(s)));
            }
            other => lines.push(format!("{key}: {other}")),
        }
    }
    lines.push(DELIMITER.to_string());
    lines.join("\n")
}

fn needs_quoting(s: &str) -> bool {
    s.contains(':')
        || s.contains('\n')
        || s.contains('\r')
        || s.starts_with(QUOTE_CHARS)
        || s.ends_with(QUOTE_CHARS)
        || s.trim() != s
}

/// Keys that would not survive the key trim (or an empty key) are written
/// quoted like values.
fn encode_key(key: &str) -> String {
    if key.is_empty() || needs_quoting(key) {
        format!("\"{}\"", escape(key))
    } else {
        key.to_string()
    }
}

fn decode_key(raw: &str) -> String {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        unescape(&raw[1..raw.len() - 1])
    } else {
        raw.to_string()
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Strips one layer of surrounding quotes. Straight double quotes on both
/// ends mark an encoder-written value and are unescaped.
fn unquote(raw: &str) -> String {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return unescape(&raw[1..raw.len() - 1]);
    }
    let s = raw.strip_prefix(QUOTE_CHARS).unwrap_or(raw);
    let s = s.strip_suffix(QUOTE_CHARS).unwrap_or(s);
    s.to_string()
}
