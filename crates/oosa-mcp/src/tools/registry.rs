//! Tool registration and dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::registry::RequestContext;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

/// A callable tool.
///
/// `validate` runs before `call`; the default checks that the arguments are
/// an object containing every parameter the input schema marks as required.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    fn validate(&self, args: &Value, definition: &ToolDefinition) -> McpResult<()> {
        let object = args
            .as_object()
            .ok_or_else(|| McpError::InvalidParams("arguments must be an object".to_string()))?;

        for name in definition.required_params() {
            match object.get(name) {
                None | Some(Value::Null) => {
                    return Err(McpError::InvalidParams(format!(
                        "missing required argument '{name}'"
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    async fn call(&self, args: Value, ctx: &RequestContext) -> McpResult<ToolCallResult>;
}

struct ToolEntry {
    definition: ToolDefinition,
    handler: Arc<dyn ToolHandler>,
}

/// Append-only table of tools keyed by name, in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    entries: Vec<ToolEntry>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Fails without touching the table if the name is taken.
    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) -> McpResult<()> {
        let definition = handler.definition();
        if self.index.contains_key(&definition.name) {
            return Err(McpError::DuplicateKey {
                kind: "tool",
                key: definition.name,
            });
        }

        tracing::debug!("Registered tool {}", definition.name);
        self.index
            .insert(definition.name.clone(), self.entries.len());
        self.entries.push(ToolEntry {
            definition,
            handler,
        });
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> McpResult<(&ToolDefinition, &dyn ToolHandler)> {
        self.index
            .get(name)
            .and_then(|&i| self.entries.get(i))
            .map(|entry| (&entry.definition, entry.handler.as_ref()))
            .ok_or_else(|| McpError::ToolNotFound(name.to_string()))
    }

    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.entries.iter().map(|e| e.definition.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve, validate and invoke a tool.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<Value>,
        ctx: &RequestContext,
    ) -> McpResult<ToolCallResult> {
        let (definition, handler) = self.resolve(name)?;
        let args = arguments.unwrap_or(Value::Object(serde_json::Map::new()));

        handler.validate(&args, definition)?;
        tracing::debug!(tool = name, request = %ctx.request_id, "Calling tool");
        handler.call(args, ctx).await
    }
}
