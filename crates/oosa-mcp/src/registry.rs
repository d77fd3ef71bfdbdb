//! The handler registry: every tool and resource the server exposes.
//!
//! Handlers are registered during startup and the registry is then frozen
//! behind an [`Arc`]; request handling only ever reads it.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::backend::Backend;
use crate::resources::{self, ResourceHandler, ResourceRegistry, ResourceRequest};
use crate::tools::{self, ToolHandler, ToolRegistry};
use crate::types::{McpResult, RequestId, ToolDefinition};

/// Per-request execution context handed to tool and resource handlers.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub cancellation: CancellationToken,
}

impl RequestContext {
    pub fn new(request_id: RequestId, cancellation: CancellationToken) -> Self {
        Self {
            request_id,
            cancellation,
        }
    }
}

/// A frozen registry, shared read-only across transports and sessions.
pub type FrozenRegistry = Arc<HandlerRegistry>;

#[derive(Default)]
pub struct HandlerRegistry {
    tools: ToolRegistry,
    resources: ResourceRegistry,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry populated with every OOSA tool and resource.
    pub fn with_defaults(backend: Arc<Backend>) -> McpResult<Self> {
        let mut registry = Self::new();
        tools::register_all(&mut registry, &backend)?;
        resources::register_all(&mut registry, &backend)?;
        Ok(registry)
    }

    pub fn register_tool(&mut self, handler: Arc<dyn ToolHandler>) -> McpResult<&mut Self> {
        self.tools.register(handler)?;
        Ok(self)
    }

    pub fn register_resource(
        &mut self,
        handler: Arc<dyn ResourceHandler>,
    ) -> McpResult<&mut Self> {
        self.resources.register(handler)?;
        Ok(self)
    }

    pub fn resolve_tool(&self, name: &str) -> McpResult<(&ToolDefinition, &dyn ToolHandler)> {
        self.tools.resolve(name)
    }

    /// Resolve a URI, binding any template parameters.
    pub fn resolve_resource(&self, uri: &str) -> McpResult<(&dyn ResourceHandler, ResourceRequest)> {
        self.resources.resolve(uri)
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    /// Stop accepting registrations.
    pub fn freeze(self) -> FrozenRegistry {
        tracing::info!(
            tools = self.tools.len(),
            resources = self.resources.len(),
            "Handler registry frozen"
        );
        Arc::new(self)
    }
}
