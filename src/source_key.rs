//! # Source Key
//!
//! Canonical comparison key for an article's primary source.
//!
//! Primary sources arrive as free-form strings: sometimes a URL
//! (`https://www.Example.com/report/`), sometimes a plain label
//! (`Government Policy Report 2024`). The key strips the parts that
//! do not change which source is meant:
//!
//! 1. surrounding whitespace
//! 2. a leading `http://` / `https://` (any case)
//! 3. a leading `www.` (any case)
//! 4. letter case
//! 5. trailing `/` characters
//!
//! Internal punctuation of plain labels is kept as-is. Every input maps to a
//! key; absent, blank and non-string inputs map to the empty string.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static RE_PROTOCOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://").expect("protocol regex"));
static RE_WWW: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^www\.").expect("www regex"));
static RE_TRAILING_SLASHES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/+$").expect("trailing slash regex"));

/// Normalize an optional source string into its comparison key.
pub fn normalize(input: Option<&str>) -> String {
    input.map(normalize_str).unwrap_or_default()
}

/// Normalize a source string into its comparison key.
///
/// The steps are re-applied until the key stops changing, so inputs such as
/// `http://http://a.com` or `example.com/ /` still yield a key that is its
/// own normalization.
pub fn normalize_str(input: &str) -> String {
    let mut current = strip_once(input);
    loop {
        let next = strip_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Normalize an untyped JSON value. Only strings carry a source; numbers,
/// booleans, arrays, objects and `null` all yield the empty key.
pub fn normalize_value(value: &Value) -> String {
    match value {
        Value::String(s) => normalize_str(s),
        _ => String::new(),
    }
}

/// `true` when two source strings denote the same source.
pub fn same_source(a: &str, b: &str) -> bool {
    normalize_str(a) == normalize_str(b)
}

fn strip_once(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let no_protocol = RE_PROTOCOL.replace(trimmed, "");
    let no_www = RE_WWW.replace(&no_protocol, "");
    let lowered = no_www.to_lowercase();
    RE_TRAILING_SLASHES.replace(&lowered, "").into_owned()
}
