//! Tool: filter_by_category. Attractions in one category.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::backend::Backend;
use crate::registry::RequestContext;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::ToolHandler;

#[derive(Debug, Deserialize)]
struct CategoryParams {
    category: String,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "filter_by_category".to_string(),
        description: Some("List attractions in a category (case-insensitive)".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "category": { "type": "string", "description": "Category name, e.g. 博物館" }
            },
            "required": ["category"]
        }),
    }
}

pub struct FilterByCategory {
    backend: Arc<Backend>,
}

impl FilterByCategory {
    pub fn new(backend: Arc<Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ToolHandler for FilterByCategory {
    fn definition(&self) -> ToolDefinition {
        definition()
    }

    async fn call(&self, args: Value, _ctx: &RequestContext) -> McpResult<ToolCallResult> {
        let params: CategoryParams =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        let results = self.backend.catalog().filter_by_category(&params.category)?;
        Ok(ToolCallResult::json(&results))
    }
}
