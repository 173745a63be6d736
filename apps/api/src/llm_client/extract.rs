//! Recovers a JSON object from free-form model output.
//!
//! Models are asked for bare JSON but regularly wrap it in a ```json fence or
//! surround it with prose. Two strategies are tried in order:
//!
//! 1. The first ```json fenced block, up to the next closing ``` fence.
//! 2. The span from the first `{` to the last `}` of the whole text.
//!
//! The second strategy is a heuristic, not a grammar: a stray `}` in trailing
//! prose extends the span past the intended object and the parse fails. That
//! case yields `None` rather than a guess at a tighter span.

use serde_json::{Map, Value};

const JSON_FENCE: &str = "```json";
const CLOSING_FENCE: &str = "```";

/// Returns the JSON object embedded in `text`, or `None` if neither strategy
/// yields a well-formed object.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    fenced_block(text)
        .and_then(parse_object)
        .or_else(|| brace_span(text).and_then(parse_object))
}

/// Contents of the first ```json block, trimmed. `None` if the marker or its
/// closing fence is missing.
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find(JSON_FENCE)? + JSON_FENCE.len();
    let rest = &text[start..];
    let end = rest.find(CLOSING_FENCE)?;
    Some(rest[..end].trim())
}

/// First `{` through last `}`, inclusive.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start >= end {
        return None;
    }
    Some(&text[start..=end])
}

fn parse_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
