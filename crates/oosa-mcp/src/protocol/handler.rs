//! Request dispatcher: routes JSON-RPC messages to the registered handlers.
//!
//! Every failure below this boundary becomes an error envelope for the
//! caller; nothing a handler does can take down the transport.

use serde_json::Value;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::registry::{FrozenRegistry, RequestContext};
use crate::types::*;

use super::negotiation::NegotiatedCapabilities;
use super::validator::{validate_notification, validate_request};

/// Dispatches incoming JSON-RPC messages for one client connection.
pub struct ProtocolHandler {
    registry: FrozenRegistry,
    capabilities: Mutex<NegotiatedCapabilities>,
}

impl ProtocolHandler {
    pub fn new(registry: FrozenRegistry) -> Self {
        Self {
            registry,
            capabilities: Mutex::new(NegotiatedCapabilities::default()),
        }
    }

    pub fn registry(&self) -> &FrozenRegistry {
        &self.registry
    }

    /// Handle one message. Requests always yield exactly one response;
    /// notifications and stray responses yield none.
    pub async fn handle_message(
        &self,
        msg: JsonRpcMessage,
        cancellation: &CancellationToken,
    ) -> Option<Value> {
        match msg {
            JsonRpcMessage::Request(req) => Some(self.handle_request(req, cancellation).await),
            JsonRpcMessage::Notification(notif) => {
                self.handle_notification(notif).await;
                None
            }
            _ => {
                tracing::warn!("Received unexpected message type from client");
                None
            }
        }
    }

    async fn handle_request(
        &self,
        request: JsonRpcRequest,
        cancellation: &CancellationToken,
    ) -> Value {
        if let Err(e) = validate_request(&request) {
            return error_value(&e, request.id);
        }

        let ctx = RequestContext::new(request.id.clone(), cancellation.child_token());
        if ctx.cancellation.is_cancelled() {
            tracing::debug!(id = %request.id, "Refusing request, server is stopping");
            return error_value(&McpError::RequestCancelled, request.id);
        }
        tracing::debug!(id = %request.id, method = %request.method, "Dispatching request");

        let result = self.dispatch_request(&request, &ctx).await;

        match result {
            Ok(value) => serde_json::to_value(JsonRpcResponse::success(request.id, value))
                .unwrap_or_default(),
            Err(e) => {
                tracing::debug!(id = %request.id, "Request failed: {e}");
                error_value(&e, request.id)
            }
        }
    }

    async fn dispatch_request(
        &self,
        request: &JsonRpcRequest,
        ctx: &RequestContext,
    ) -> McpResult<Value> {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params.clone()).await,

            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tools_call(request.params.clone(), ctx).await,

            "resources/list" => self.handle_resources_list(),
            "resources/templates/list" => self.handle_resource_templates_list(),
            "resources/read" => self.handle_resources_read(request.params.clone(), ctx).await,

            "ping" => Ok(Value::Object(serde_json::Map::new())),

            _ => Err(McpError::MethodNotFound(request.method.clone())),
        }
    }

    async fn handle_notification(&self, notification: JsonRpcNotification) {
        if let Err(e) = validate_notification(&notification) {
            tracing::warn!("Ignoring malformed notification: {e}");
            return;
        }

        match notification.method.as_str() {
            "initialized" | "notifications/initialized" => {
                if !self.capabilities.lock().await.mark_initialized() {
                    tracing::debug!("Ignoring repeated initialized notification");
                }
            }
            "notifications/cancelled" => {
                let params = notification
                    .params
                    .map(serde_json::from_value::<CancelledParams>);
                match params {
                    Some(Ok(p)) => tracing::info!(
                        request_id = %p.request_id,
                        reason = p.reason.as_deref().unwrap_or(""),
                        "Client cancelled request"
                    ),
                    _ => tracing::info!("Received cancellation notification"),
                }
            }
            _ => {
                tracing::debug!("Unknown notification: {}", notification.method);
            }
        }
    }

    async fn handle_initialize(&self, params: Option<Value>) -> McpResult<Value> {
        let init_params: InitializeParams = parse_params(params, "Initialize params required")?;

        let mut caps = self.capabilities.lock().await;
        let result = caps.negotiate(init_params);

        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    fn handle_tools_list(&self) -> McpResult<Value> {
        let result = ToolListResult {
            tools: self.registry.tools().list_tools(),
            next_cursor: None,
        };
        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    async fn handle_tools_call(
        &self,
        params: Option<Value>,
        ctx: &RequestContext,
    ) -> McpResult<Value> {
        let call_params: ToolCallParams = parse_params(params, "Tool call params required")?;

        let result = self
            .registry
            .tools()
            .call(&call_params.name, call_params.arguments, ctx)
            .await?;

        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    fn handle_resources_list(&self) -> McpResult<Value> {
        let result = ResourceListResult {
            resources: self.registry.resources().list_resources(),
            next_cursor: None,
        };
        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    fn handle_resource_templates_list(&self) -> McpResult<Value> {
        let result = ResourceTemplateListResult {
            resource_templates: self.registry.resources().list_templates(),
            next_cursor: None,
        };
        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    async fn handle_resources_read(
        &self,
        params: Option<Value>,
        ctx: &RequestContext,
    ) -> McpResult<Value> {
        let read_params: ResourceReadParams =
            parse_params(params, "Resource read params required")?;

        let result = self.registry.resources().read(&read_params.uri, ctx).await?;

        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(
    params: Option<Value>,
    missing: &str,
) -> McpResult<T> {
    params
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::InvalidParams(e.to_string()))?
        .ok_or_else(|| McpError::InvalidParams(missing.to_string()))
}

fn error_value(error: &McpError, id: RequestId) -> Value {
    serde_json::to_value(error.to_response(id)).unwrap_or_default()
}
