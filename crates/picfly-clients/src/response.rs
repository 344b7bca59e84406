use serde_json::Value;

use crate::ClientError;

/// Pull the text at `pointer` out of a service response.
///
/// Strings are returned as-is, arrays of strings (or of objects with a `text` field) are
/// joined line by line. An empty pointer addresses the whole body, and a body that is not
/// JSON at all is accepted only then, so hosts that answer with a bare link work too.
pub fn extract_text(body: &str, pointer: &str) -> Result<String, ClientError> {
    let json: Value = match serde_json::from_str(body) {
        Ok(json) => json,
        Err(_) if pointer.is_empty() => return Ok(body.trim().to_string()),
        Err(e) => return Err(ClientError::Response(format!("body is not JSON: {e}"))),
    };

    let value = json
        .pointer(pointer)
        .ok_or_else(|| ClientError::Response(format!("nothing at {pointer:?} in response")))?;

    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Array(items) => items
            .iter()
            .map(line_of)
            .collect::<Option<Vec<_>>>()
            .map(|lines| lines.join("\n"))
            .ok_or_else(|| ClientError::Response(format!("mixed array at {pointer:?}"))),
        other => Err(ClientError::Response(format!(
            "expected text at {pointer:?}, found {other}"
        ))),
    }
}

fn line_of(item: &Value) -> Option<&str> {
    match item {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => map.get("text").and_then(Value::as_str),
        _ => None,
    }
}

/// Shorten an error body for logs and notifications.
pub(crate) fn snippet(body: &str) -> String {
    const MAX: usize = 200;
    let body = body.trim();
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
