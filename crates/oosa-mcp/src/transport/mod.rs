//! Transport layer for MCP communication.

pub mod framing;
pub mod io_log;
#[cfg(feature = "sse")]
pub mod sse;
pub mod stdio;

pub use io_log::{Direction, IoRecord, IoSink, LoggedReader, LoggedWriter, TracingSink};
#[cfg(feature = "sse")]
pub use sse::SseTransport;
pub use stdio::StdioTransport;
