//! Resource: oosa://attractions

use std::sync::Arc;

use async_trait::async_trait;

use crate::backend::Backend;
use crate::registry::RequestContext;
use crate::types::{McpResult, ReadResourceResult, ResourceContent};

use super::{ResourceDescriptor, ResourceHandler, ResourceRequest};

pub const URI: &str = "oosa://attractions";

pub struct AllAttractions {
    backend: Arc<Backend>,
}

impl AllAttractions {
    pub fn new(backend: Arc<Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ResourceHandler for AllAttractions {
    fn descriptor(&self) -> ResourceDescriptor {
        ResourceDescriptor {
            key: URI.to_string(),
            name: "OOSA Attractions".to_string(),
            description: Some("Every attraction in the OOSA catalogue".to_string()),
            mime_type: Some("application/json".to_string()),
        }
    }

    async fn read(
        &self,
        request: &ResourceRequest,
        _ctx: &RequestContext,
    ) -> McpResult<ReadResourceResult> {
        Ok(ReadResourceResult {
            contents: vec![ResourceContent::json(
                &request.uri,
                &self.backend.catalog().all(),
            )],
        })
    }
}
