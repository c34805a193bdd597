//! Tolerant parsing of summarizer replies
//!
//! Chat-completion style services do not agree on where the generated text
//! lives. The parser tries a fixed list of locations, most specific first,
//! and reports `Missing` when none of them holds a string.

use serde_json::Value;

/// JSON pointers tried in order
const COMPLETION_POINTERS: &[&str] = &["/choices/0/message/content", "/choices/0/text", "/content"];

/// Outcome of parsing a reply body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The body was empty or whitespace only
    Empty,
    /// The body was not JSON
    Malformed(String),
    /// JSON without a completion at any known location
    Missing,
    /// The completion text, untrimmed
    Completion(String),
}

/// Parses a raw response body
pub fn parse_reply(body: &str) -> Reply {
    if body.trim().is_empty() {
        return Reply::Empty;
    }

    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => return Reply::Malformed(e.to_string()),
    };

    COMPLETION_POINTERS
        .iter()
        .find_map(|pointer| value.pointer(pointer).and_then(Value::as_str))
        .map(|text| Reply::Completion(text.to_string()))
        .unwrap_or(Reply::Missing)
}
