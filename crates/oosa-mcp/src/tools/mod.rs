//! MCP tool implementations.

pub mod filter_by_category;
pub mod get_events;
pub mod get_ideas;
pub mod registry;
pub mod search_attractions;

use std::sync::Arc;

use crate::backend::Backend;
use crate::registry::HandlerRegistry;
use crate::types::McpResult;

pub use registry::{ToolHandler, ToolRegistry};

/// Register every OOSA tool.
pub fn register_all(registry: &mut HandlerRegistry, backend: &Arc<Backend>) -> McpResult<()> {
    registry
        .register_tool(Arc::new(get_events::GetEvents::new(backend.clone())))?
        .register_tool(Arc::new(get_ideas::GetIdeas::new(backend.clone())))?
        .register_tool(Arc::new(search_attractions::SearchAttractions::new(
            backend.clone(),
        )))?
        .register_tool(Arc::new(filter_by_category::FilterByCategory::new(
            backend.clone(),
        )))?;
    Ok(())
}
