//! Recovering JSON from free-form model completions.
//!
//! Completions are not guaranteed to be pure JSON: models wrap answers in
//! prose or markdown fences, and sometimes answer with an array where an
//! object was asked for. Two bounded attempts are made:
//!
//! 1. the slice from the first `{` to the last `}` parsed as an object;
//! 2. the slice from the first `[` to the last `]` parsed as an array,
//!    returned wrapped as `{"items": [...]}`.
//!
//! Callers therefore always receive an object.

use serde_json::{Map, Value};
use thiserror::Error;

/// Key under which an array-shaped answer is wrapped.
pub const ITEMS_KEY: &str = "items";

/// Neither attempt produced JSON of the expected shape.
#[derive(Debug, Error)]
#[error("No JSON object or array found in completion: {source}")]
pub struct ExtractionError {
    #[source]
    pub source: serde_json::Error,
}

/// Extract a JSON object from completion text.
pub fn extract_json(text: &str) -> Result<Map<String, Value>, ExtractionError> {
    match parse_bounded::<Map<String, Value>>(text, '{', '}') {
        Ok(object) => Ok(object),
        Err(_) => {
            let items = parse_bounded::<Vec<Value>>(text, '[', ']')
                .map_err(|source| ExtractionError { source })?;
            tracing::debug!("Expected a JSON object, got an array; wrapping as \"{}\"", ITEMS_KEY);

            let mut object = Map::new();
            object.insert(ITEMS_KEY.to_string(), Value::Array(items));
            Ok(object)
        }
    }
}

/// Parse the slice between the first `open` and the last `close`.
///
/// A missing delimiter leaves that end of the text unbounded, so the parse
/// fails on the surrounding prose instead of panicking.
fn parse_bounded<T: serde::de::DeserializeOwned>(
    text: &str,
    open: char,
    close: char,
) -> Result<T, serde_json::Error> {
    let start = text.find(open).unwrap_or(0);
    let tail = &text[start..];
    let slice = match tail.rfind(close) {
        Some(end) => &tail[..=end],
        None => tail,
    };
    serde_json::from_str(slice)
}
