//! Extraction of a JSON object from free-text provider answers.
//!
//! Providers are asked for bare JSON but routinely wrap it in prose or
//! markdown fences. The extractor takes the span from the first `{` to the
//! last `}` in the text and parses it as one object.
//!
//! The greedy span is a known correctness boundary: prose that contains an
//! unrelated `{` before the object, or a `}` after it, yields a span that is
//! not valid JSON and the answer is reported as a [`ParseFailure`]. The
//! heuristic is kept as-is so answers are interpreted the same way by every
//! client of the API.

use serde_json::{Map, Value};
use std::fmt;

/// Maximum number of characters of raw text kept for diagnostics.
pub const EXCERPT_CHARS: usize = 200;

/// The provider answered, but no JSON object could be recovered from the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    /// First [`EXCERPT_CHARS`] characters of the raw answer.
    pub excerpt: String,
    /// Why parsing failed.
    pub reason: String,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (response began: {:?})", self.reason, self.excerpt)
    }
}

impl std::error::Error for ParseFailure {}

/// Returns the first `max_chars` characters of `text`, respecting UTF-8 boundaries.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Locates the greedy `{ ... }` span: first `{` through last `}`.
fn object_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end > start {
        Some(&raw[start..=end])
    } else {
        None
    }
}

/// Extracts the JSON object embedded in `raw`.
///
/// Falls back to parsing the whole text when no `{ ... }` span exists, for
/// providers that answer with bare JSON. Anything that is not a JSON object
/// is a [`ParseFailure`].
pub fn extract_json(raw: &str) -> Result<Map<String, Value>, ParseFailure> {
    let failure = |reason: String| ParseFailure {
        excerpt: truncate_chars(raw, EXCERPT_CHARS),
        reason,
    };

    let span = object_span(raw);

    match serde_json::from_str::<Value>(span.unwrap_or(raw)) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(failure(format!(
            "expected a JSON object, found {}",
            json_kind(&other)
        ))),
        Err(e) if span.is_some() => {
            Err(failure(format!("invalid JSON object in response: {}", e)))
        }
        Err(e) => Err(failure(format!("no JSON object found in response: {}", e))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
