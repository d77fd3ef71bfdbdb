//! Tool: search_attractions. Free-text search over the attraction catalogue.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::backend::Backend;
use crate::registry::RequestContext;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::ToolHandler;

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: String,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "search_attractions".to_string(),
        description: Some(
            "Search attractions by name, description, category, or location".to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Case-insensitive search text" }
            },
            "required": ["query"]
        }),
    }
}

pub struct SearchAttractions {
    backend: Arc<Backend>,
}

impl SearchAttractions {
    pub fn new(backend: Arc<Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ToolHandler for SearchAttractions {
    fn definition(&self) -> ToolDefinition {
        definition()
    }

    async fn call(&self, args: Value, _ctx: &RequestContext) -> McpResult<ToolCallResult> {
        let params: SearchParams =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        let results = self.backend.catalog().search(&params.query)?;
        tracing::debug!(query = %params.query, hits = results.len(), "Attraction search");

        Ok(ToolCallResult::json(&results))
    }
}
