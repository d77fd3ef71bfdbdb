//! JSON-RPC validation, capability negotiation, and method dispatch.

pub mod handler;
pub mod negotiation;
pub mod validator;

pub use handler::ProtocolHandler;
