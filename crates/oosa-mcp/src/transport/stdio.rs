//! Stdio transport: newline-delimited JSON-RPC over a byte stream.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;

use crate::protocol::ProtocolHandler;
use crate::types::{McpError, McpResult};

use super::framing;
use super::io_log::{self, TracingSink};

/// Stdio transport for desktop MCP clients.
pub struct StdioTransport {
    handler: ProtocolHandler,
    log_commands: bool,
}

impl StdioTransport {
    pub fn new(handler: ProtocolHandler) -> Self {
        Self {
            handler,
            log_commands: false,
        }
    }

    /// Record every raw read and write on the process streams.
    pub fn with_command_logging(mut self, enabled: bool) -> Self {
        self.log_commands = enabled;
        self
    }

    /// Serve on the process's stdin and stdout until EOF or cancellation.
    pub async fn run(&self, ct: CancellationToken) -> McpResult<()> {
        self.run_on(tokio::io::stdin(), tokio::io::stdout(), ct).await
    }

    /// Serve on `reader`/`writer`, intercepting both when command logging
    /// is enabled.
    pub async fn run_on<R, W>(&self, reader: R, writer: W, ct: CancellationToken) -> McpResult<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        if self.log_commands {
            tracing::info!("Command logging enabled");
            let (reader, writer) = io_log::intercept(reader, writer, Arc::new(TracingSink));
            self.serve(reader, writer, ct).await
        } else {
            self.serve(reader, writer, ct).await
        }
    }

    /// Serve on an arbitrary stream pair.
    ///
    /// Messages are handled one at a time and each response is written and
    /// flushed before the next line is read. Cancellation is only observed
    /// between messages; a handler that has started runs to completion.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W, ct: CancellationToken) -> McpResult<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut reader = BufReader::new(reader);
        let mut line = Vec::new();

        tracing::info!("Stdio transport started");

        loop {
            line.clear();
            let bytes_read = tokio::select! {
                biased;
                () = ct.cancelled() => {
                    tracing::info!("Stdio transport cancelled");
                    break;
                }
                read = reader.read_until(b'\n', &mut line) => read.map_err(McpError::Io)?,
            };

            if bytes_read == 0 {
                tracing::info!("EOF on input, stdio transport finished");
                break;
            }

            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            let reply = match framing::parse_bytes(&line) {
                Ok(msg) => self.handler.handle_message(msg, &ct).await,
                Err(e) => {
                    tracing::warn!("Parse error: {e}");
                    Some(framing::null_id_error(&e))
                }
            };

            if let Some(response) = reply {
                let framed = framing::frame_message(&response)?;
                writer
                    .write_all(framed.as_bytes())
                    .await
                    .map_err(McpError::Io)?;
                writer.flush().await.map_err(McpError::Io)?;
            }
        }

        Ok(())
    }
}
