//! MCP resource implementations.

pub mod attraction;
pub mod attractions;
pub mod registry;

use std::sync::Arc;

use crate::backend::Backend;
use crate::registry::HandlerRegistry;
use crate::types::McpResult;

pub use registry::{ResourceDescriptor, ResourceHandler, ResourceRegistry, ResourceRequest};

/// Register every OOSA resource.
pub fn register_all(registry: &mut HandlerRegistry, backend: &Arc<Backend>) -> McpResult<()> {
    registry
        .register_resource(Arc::new(attractions::AllAttractions::new(backend.clone())))?
        .register_resource(Arc::new(attraction::AttractionById::new(backend.clone())))?;
    Ok(())
}
