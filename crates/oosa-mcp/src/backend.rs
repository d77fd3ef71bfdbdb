//! Shared, read-only domain state backing the tools and resources.

use std::path::Path;

use oosa::{AttractionCatalog, OosaClient};

use crate::types::{McpError, McpResult};

pub struct Backend {
    client: OosaClient,
    catalog: AttractionCatalog,
}

impl Backend {
    pub fn new(client: OosaClient, catalog: AttractionCatalog) -> Self {
        Self { client, catalog }
    }

    /// Open the backend, loading attractions from `attractions` when given
    /// and from the built-in catalogue otherwise.
    pub fn open(attractions: Option<&Path>) -> McpResult<Self> {
        let catalog = match attractions {
            Some(path) => AttractionCatalog::load(path).map_err(|e| {
                McpError::Config(format!(
                    "Failed to load attractions from {}: {e}",
                    path.display()
                ))
            })?,
            None => AttractionCatalog::builtin()?,
        };

        tracing::info!("Attraction catalogue has {} entries", catalog.len());
        Ok(Self::new(OosaClient::new(), catalog))
    }

    pub fn client(&self) -> &OosaClient {
        &self.client
    }

    pub fn catalog(&self) -> &AttractionCatalog {
        &self.catalog
    }
}
