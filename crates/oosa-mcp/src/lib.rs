//! OOSA MCP Server: events, ideas, and attractions for LLM clients over
//! stdio or HTTP/SSE.

pub mod backend;
pub mod config;
pub mod lifecycle;
pub mod protocol;
pub mod registry;
pub mod resources;
pub mod tools;
pub mod transport;
pub mod types;

pub use backend::Backend;
pub use config::{RunConfig, ServeSettings, TransportKind};
pub use lifecycle::{Coordinator, LifecycleState, ShutdownReason};
pub use protocol::ProtocolHandler;
pub use registry::{FrozenRegistry, HandlerRegistry, RequestContext};
pub use transport::StdioTransport;
