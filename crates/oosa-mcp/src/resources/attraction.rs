//! Resource: oosa://attraction/{id}

use std::sync::Arc;

use async_trait::async_trait;

use crate::backend::Backend;
use crate::registry::RequestContext;
use crate::types::{McpResult, ReadResourceResult, ResourceContent};

use super::{ResourceDescriptor, ResourceHandler, ResourceRequest};

pub const URI_TEMPLATE: &str = "oosa://attraction/{id}";

pub struct AttractionById {
    backend: Arc<Backend>,
}

impl AttractionById {
    pub fn new(backend: Arc<Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ResourceHandler for AttractionById {
    fn descriptor(&self) -> ResourceDescriptor {
        ResourceDescriptor {
            key: URI_TEMPLATE.to_string(),
            name: "Attraction by ID".to_string(),
            description: Some("Details of a single attraction".to_string()),
            mime_type: Some("application/json".to_string()),
        }
    }

    async fn read(
        &self,
        request: &ResourceRequest,
        _ctx: &RequestContext,
    ) -> McpResult<ReadResourceResult> {
        let id = request.param("id")?;
        let attraction = self.backend.catalog().get(id)?;

        Ok(ReadResourceResult {
            contents: vec![ResourceContent::json(&request.uri, attraction)],
        })
    }
}
