//! Tool: get_ideas. List recent activity ideas.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::backend::Backend;
use crate::registry::RequestContext;
use crate::types::{McpResult, ToolCallResult, ToolDefinition};

use super::ToolHandler;

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "get_ideas".to_string(),
        description: Some("List recent OOSA activity ideas".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {}
        }),
    }
}

pub struct GetIdeas {
    backend: Arc<Backend>,
}

impl GetIdeas {
    pub fn new(backend: Arc<Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ToolHandler for GetIdeas {
    fn definition(&self) -> ToolDefinition {
        definition()
    }

    async fn call(&self, _args: Value, _ctx: &RequestContext) -> McpResult<ToolCallResult> {
        let ideas = self.backend.client().get_ideas(chrono::Utc::now());
        Ok(ToolCallResult::json(&ideas))
    }
}
