//! JSON-RPC message validation.

use crate::types::{JsonRpcNotification, JsonRpcRequest, McpError, McpResult, JSONRPC_VERSION};

/// Method names starting with this prefix are reserved by JSON-RPC itself.
const RESERVED_PREFIX: &str = "rpc.";

fn validate_envelope(jsonrpc: &str, method: &str) -> McpResult<()> {
    if jsonrpc != JSONRPC_VERSION {
        return Err(McpError::InvalidRequest(format!(
            "Expected jsonrpc version \"{JSONRPC_VERSION}\", got \"{jsonrpc}\""
        )));
    }

    if method.trim().is_empty() {
        return Err(McpError::InvalidRequest(
            "Method name must not be empty".to_string(),
        ));
    }

    if method.starts_with(RESERVED_PREFIX) {
        return Err(McpError::InvalidRequest(format!(
            "Method name \"{method}\" uses the reserved \"{RESERVED_PREFIX}\" prefix"
        )));
    }

    Ok(())
}

/// Validate that a JSON-RPC request is well-formed.
pub fn validate_request(request: &JsonRpcRequest) -> McpResult<()> {
    validate_envelope(&request.jsonrpc, &request.method)
}

/// Validate that a JSON-RPC notification is well-formed.
pub fn validate_notification(notification: &JsonRpcNotification) -> McpResult<()> {
    validate_envelope(&notification.jsonrpc, &notification.method)
}
