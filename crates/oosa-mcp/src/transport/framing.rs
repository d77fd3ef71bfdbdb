//! Message framing for newline-delimited JSON.

use serde_json::Value;

use crate::types::{JsonRpcMessage, McpError, McpResult, RequestId};

/// Parse a single line of text as a JSON-RPC message.
pub fn parse_message(line: &str) -> McpResult<JsonRpcMessage> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(McpError::ParseError("Empty message".to_string()));
    }

    serde_json::from_str(trimmed).map_err(|e| McpError::ParseError(e.to_string()))
}

/// Parse raw bytes as a JSON-RPC message, rejecting invalid UTF-8.
pub fn parse_bytes(bytes: &[u8]) -> McpResult<JsonRpcMessage> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| McpError::ParseError(format!("Invalid UTF-8: {e}")))?;
    parse_message(text)
}

/// Serialize a value to a JSON line (with trailing newline).
pub fn frame_message(value: &Value) -> McpResult<String> {
    let mut json = serde_json::to_string(value).map_err(McpError::Json)?;
    json.push('\n');
    Ok(json)
}

/// Error envelope with a null id, for failures where the request id is unknown.
pub fn null_id_error(error: &McpError) -> Value {
    serde_json::to_value(error.to_response(RequestId::Null)).unwrap_or_default()
}
