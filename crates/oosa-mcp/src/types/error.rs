//! Error types and JSON-RPC error codes for the MCP server.

use super::message::{JsonRpcResponse, RequestId};

/// Standard JSON-RPC 2.0 error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// MCP-specific error codes.
pub mod mcp_error_codes {
    pub const REQUEST_CANCELLED: i32 = -32800;
    pub const RESOURCE_NOT_FOUND: i32 = -32802;
    pub const TOOL_NOT_FOUND: i32 = -32803;
    pub const DOMAIN_ERROR: i32 = -32850;

    /// Server: request rejected because its Origin does not match the base URL.
    pub const ORIGIN_REJECTED: i32 = -32903;
    /// Server: unknown or expired SSE session.
    pub const SESSION_NOT_FOUND: i32 = -32904;
}

/// All errors that can occur in the MCP server.
#[derive(thiserror::Error, Debug)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Request cancelled")]
    RequestCancelled,

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// A tool or resource with this key is already registered.
    #[error("Duplicate {kind} key: {key}")]
    DuplicateKey { kind: &'static str, key: String },

    #[error("{0}")]
    Domain(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Origin not allowed: {0}")]
    OriginRejected(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl McpError {
    pub fn code(&self) -> i32 {
        use error_codes::*;
        use mcp_error_codes::*;
        match self {
            McpError::ParseError(_) => PARSE_ERROR,
            McpError::InvalidRequest(_) => INVALID_REQUEST,
            McpError::MethodNotFound(_) => METHOD_NOT_FOUND,
            McpError::InvalidParams(_) => INVALID_PARAMS,
            McpError::InternalError(_) => INTERNAL_ERROR,
            McpError::RequestCancelled => REQUEST_CANCELLED,
            McpError::ResourceNotFound(_) => RESOURCE_NOT_FOUND,
            McpError::ToolNotFound(_) => TOOL_NOT_FOUND,
            McpError::Domain(_) => DOMAIN_ERROR,
            McpError::OriginRejected(_) => ORIGIN_REJECTED,
            McpError::SessionNotFound(_) => SESSION_NOT_FOUND,
            McpError::DuplicateKey { .. }
            | McpError::Config(_)
            | McpError::Transport(_)
            | McpError::Io(_) => INTERNAL_ERROR,
            McpError::Json(_) => PARSE_ERROR,
        }
    }

    pub fn to_response(&self, id: RequestId) -> JsonRpcResponse {
        JsonRpcResponse::failure(id, self.code(), self.to_string())
    }
}

impl From<oosa::OosaError> for McpError {
    fn from(e: oosa::OosaError) -> Self {
        match e {
            oosa::OosaError::InvalidInput(msg) => McpError::InvalidParams(msg),
            other => McpError::Domain(other.to_string()),
        }
    }
}

impl From<::config::ConfigError> for McpError {
    fn from(e: ::config::ConfigError) -> Self {
        McpError::Config(e.to_string())
    }
}

pub type McpResult<T> = Result<T, McpError>;
