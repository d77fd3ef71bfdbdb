//! Resource registration and dispatch.
//!
//! Resources are keyed by a URI (`oosa://attractions`) or a URI template
//! (`oosa://attraction/{id}`). Each `{name}` placeholder matches exactly one
//! non-empty path segment.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::registry::RequestContext;
use crate::types::{
    McpError, McpResult, ReadResourceResult, ResourceDefinition, ResourceTemplateDefinition,
};

/// Metadata for a registered resource.
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    /// URI, or URI template when it contains `{…}` placeholders.
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub mime_type: Option<String>,
}

impl ResourceDescriptor {
    pub fn is_template(&self) -> bool {
        self.key.contains('{')
    }
}

/// A concrete read against a resource, with any template parameters bound.
#[derive(Debug, Clone)]
pub struct ResourceRequest {
    pub uri: String,
    pub params: HashMap<String, String>,
}

impl ResourceRequest {
    pub fn param(&self, name: &str) -> McpResult<&str> {
        self.params
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| McpError::InvalidParams(format!("missing URI parameter '{name}'")))
    }
}

/// A readable resource.
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    fn descriptor(&self) -> ResourceDescriptor;

    async fn read(
        &self,
        request: &ResourceRequest,
        ctx: &RequestContext,
    ) -> McpResult<ReadResourceResult>;
}

struct ResourceEntry {
    descriptor: ResourceDescriptor,
    segments: Vec<Segment>,
    handler: Arc<dyn ResourceHandler>,
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Param(String),
}

fn parse_template(key: &str) -> McpResult<Vec<Segment>> {
    key.split('/')
        .map(|segment| {
            if let Some(name) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                if name.is_empty() || name.contains(['{', '}']) {
                    return Err(McpError::Config(format!("invalid URI template: {key}")));
                }
                Ok(Segment::Param(name.to_string()))
            } else if segment.contains(['{', '}']) {
                Err(McpError::Config(format!("invalid URI template: {key}")))
            } else {
                Ok(Segment::Literal(segment.to_string()))
            }
        })
        .collect()
}

fn match_template(segments: &[Segment], uri: &str) -> Option<HashMap<String, String>> {
    let parts: Vec<&str> = uri.split('/').collect();
    if parts.len() != segments.len() {
        return None;
    }

    let mut params = HashMap::new();
    for (segment, part) in segments.iter().zip(parts) {
        match segment {
            Segment::Literal(lit) if lit == part => {}
            Segment::Param(name) if !part.is_empty() => {
                params.insert(name.clone(), part.to_string());
            }
            _ => return None,
        }
    }
    Some(params)
}

/// Append-only table of resources and resource templates.
#[derive(Default)]
pub struct ResourceRegistry {
    entries: Vec<ResourceEntry>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource. Fails without touching the table if the key is taken.
    pub fn register(&mut self, handler: Arc<dyn ResourceHandler>) -> McpResult<()> {
        let descriptor = handler.descriptor();
        if self.entries.iter().any(|e| e.descriptor.key == descriptor.key) {
            return Err(McpError::DuplicateKey {
                kind: "resource",
                key: descriptor.key,
            });
        }

        let segments = parse_template(&descriptor.key)?;
        tracing::debug!("Registered resource {}", descriptor.key);
        self.entries.push(ResourceEntry {
            descriptor,
            segments,
            handler,
        });
        Ok(())
    }

    /// Find the handler for `uri`. Exact keys win over templates; templates
    /// are tried in registration order.
    pub fn resolve(&self, uri: &str) -> McpResult<(&dyn ResourceHandler, ResourceRequest)> {
        let exact = self
            .entries
            .iter()
            .find(|e| !e.descriptor.is_template() && e.descriptor.key == uri);

        if let Some(entry) = exact {
            return Ok((
                entry.handler.as_ref(),
                ResourceRequest {
                    uri: uri.to_string(),
                    params: HashMap::new(),
                },
            ));
        }

        self.entries
            .iter()
            .filter(|e| e.descriptor.is_template())
            .find_map(|e| {
                match_template(&e.segments, uri).map(|params| {
                    (
                        e.handler.as_ref(),
                        ResourceRequest {
                            uri: uri.to_string(),
                            params,
                        },
                    )
                })
            })
            .ok_or_else(|| McpError::ResourceNotFound(uri.to_string()))
    }

    pub fn list_resources(&self) -> Vec<ResourceDefinition> {
        self.entries
            .iter()
            .filter(|e| !e.descriptor.is_template())
            .map(|e| ResourceDefinition {
                uri: e.descriptor.key.clone(),
                name: e.descriptor.name.clone(),
                description: e.descriptor.description.clone(),
                mime_type: e.descriptor.mime_type.clone(),
            })
            .collect()
    }

    pub fn list_templates(&self) -> Vec<ResourceTemplateDefinition> {
        self.entries
            .iter()
            .filter(|e| e.descriptor.is_template())
            .map(|e| ResourceTemplateDefinition {
                uri_template: e.descriptor.key.clone(),
                name: e.descriptor.name.clone(),
                description: e.descriptor.description.clone(),
                mime_type: e.descriptor.mime_type.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub async fn read(&self, uri: &str, ctx: &RequestContext) -> McpResult<ReadResourceResult> {
        let (handler, request) = self.resolve(uri)?;
        handler.read(&request, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_matches_final_segment() {
        let segments = parse_template("oosa://attraction/{id}").unwrap();
        let params = match_template(&segments, "oosa://attraction/taipei101").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("taipei101"));
    }

    #[test]
    fn test_template_rejects_shape_mismatch() {
        let segments = parse_template("oosa://attraction/{id}").unwrap();
        assert!(match_template(&segments, "oosa://attraction/").is_none());
        assert!(match_template(&segments, "oosa://attraction/a/b").is_none());
        assert!(match_template(&segments, "oosa://event/a").is_none());
    }

    #[test]
    fn test_malformed_template_rejected() {
        assert!(parse_template("oosa://attraction/{}").is_err());
        assert!(parse_template("oosa://attraction/x{id}").is_err());
    }
}
