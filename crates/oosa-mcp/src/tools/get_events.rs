//! Tool: get_events. List outdoor events, optionally filtered by time.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use oosa::{parse_timestamp, EventFilter};

use crate::backend::Backend;
use crate::registry::RequestContext;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::ToolHandler;

#[derive(Debug, Deserialize)]
struct EventsParams {
    #[serde(default)]
    event_past: Option<String>,
    #[serde(default)]
    event_period_begin: Option<String>,
    #[serde(default)]
    event_period_end: Option<String>,
}

impl EventsParams {
    fn into_filter(self) -> McpResult<EventFilter> {
        let past = match self.event_past.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(v) if v.eq_ignore_ascii_case("true") => Some(true),
            Some(v) if v.eq_ignore_ascii_case("false") => Some(false),
            Some(other) => {
                return Err(McpError::InvalidParams(format!(
                    "event_past must be \"true\" or \"false\", got \"{other}\""
                )));
            }
        };

        let timestamp = |value: Option<String>| {
            value
                .filter(|v| !v.trim().is_empty())
                .map(|v| parse_timestamp(v.trim()))
                .transpose()
        };

        Ok(EventFilter {
            past,
            period_begin: timestamp(self.event_period_begin)?,
            period_end: timestamp(self.event_period_end)?,
        })
    }
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "get_events".to_string(),
        description: Some("List OOSA outdoor events".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "event_past": {
                    "type": "string",
                    "description": "Filter events that occurred in the past (\"true\" or \"false\")"
                },
                "event_period_begin": {
                    "type": "string",
                    "description": "The beginning of the event period (RFC 3339)"
                },
                "event_period_end": {
                    "type": "string",
                    "description": "The end of the event period (RFC 3339)"
                }
            }
        }),
    }
}

pub struct GetEvents {
    backend: Arc<Backend>,
}

impl GetEvents {
    pub fn new(backend: Arc<Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ToolHandler for GetEvents {
    fn definition(&self) -> ToolDefinition {
        definition()
    }

    async fn call(&self, args: Value, _ctx: &RequestContext) -> McpResult<ToolCallResult> {
        let params: EventsParams =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        let filter = params.into_filter()?;
        let events = self.backend.client().get_events(&filter)?;

        Ok(ToolCallResult::json(&events))
    }
}
