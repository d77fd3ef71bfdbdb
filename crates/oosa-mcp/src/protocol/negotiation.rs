//! MCP capability negotiation during initialization.

use crate::types::{Implementation, InitializeParams, InitializeResult, MCP_VERSION};

/// Handshake state for one connection.
#[derive(Debug, Clone, Default)]
pub struct NegotiatedCapabilities {
    client: Option<Implementation>,
    initialized: bool,
}

impl NegotiatedCapabilities {
    pub fn negotiate(&mut self, params: InitializeParams) -> InitializeResult {
        if params.protocol_version != MCP_VERSION {
            tracing::warn!(
                "Client requested protocol version {}, server supports {}. Proceeding with server version.",
                params.protocol_version,
                MCP_VERSION
            );
        }

        if let Some(previous) = &self.client {
            tracing::warn!(previous = %previous.name, "Client sent initialize again");
        }

        tracing::info!(
            "Initialized with client: {} v{}",
            params.client_info.name,
            params.client_info.version
        );

        self.client = Some(params.client_info);

        InitializeResult::default_result()
    }

    /// Record the client's `initialized` notification. Returns `false` when
    /// the handshake was already complete.
    pub fn mark_initialized(&mut self) -> bool {
        if self.initialized {
            return false;
        }
        self.initialized = true;

        let client = self.client.as_ref().map_or("unknown client", |c| c.name.as_str());
        tracing::info!(client, "MCP handshake complete");
        true
    }
}
