//! Turning raw model text into a JSON value.
//!
//! Models asked for JSON still sometimes wrap it in a markdown code fence. Only syntax is
//! handled here; the shape of the value is the normalizer's concern.

use serde_json::Value;

use crate::error::SplitError;

/// Parse the JSON payload out of model text, unwrapping the first code fence if present.
pub fn extract_payload(text: &str) -> Result<Value, SplitError> {
    let body = fenced_body(text).unwrap_or(text).trim();
    if body.is_empty() {
        return Err(SplitError::InvalidPayload("empty response".to_string()));
    }
    serde_json::from_str(body).map_err(|err| SplitError::InvalidPayload(err.to_string()))
}

/// Contents of the first ```` ``` ```` / ```` ```json ```` block, if the text has one.
fn fenced_body(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let rest = &text[open + 3..];
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let close = rest.find("```")?;
    Some(rest[..close].trim())
}
