//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use oosa_mcp::protocol::ProtocolHandler;
use oosa_mcp::tools::ToolHandler;
use oosa_mcp::transport::{Direction, IoRecord, IoSink};
use oosa_mcp::types::*;
use oosa_mcp::{Backend, HandlerRegistry, RequestContext};

// ─────────────────────── handlers ───────────────────────

/// Tool that counts its invocations and optionally takes a while.
pub struct CountingTool {
    pub name: &'static str,
    pub calls: Arc<AtomicUsize>,
    pub delay: Duration,
}

impl CountingTool {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            calls: Arc::new(AtomicUsize::new(0)),
            delay: Duration::ZERO,
        }
    }

    pub fn slow(name: &'static str, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new(name)
        }
    }

    pub fn counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl ToolHandler for CountingTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.to_string(),
            description: Some("Counts calls".to_string()),
            input_schema: json!({ "type": "object", "properties": {} }),
        }
    }

    async fn call(&self, _args: Value, _ctx: &RequestContext) -> McpResult<ToolCallResult> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ToolCallResult::text(format!("call {n}")))
    }
}

/// Sink that keeps every intercepted record in memory.
#[derive(Default)]
pub struct CollectingSink(Mutex<Vec<IoRecord>>);

impl CollectingSink {
    /// Concatenated payloads in one direction.
    pub fn bytes(&self, direction: Direction) -> Vec<u8> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.direction == direction)
            .flat_map(|r| r.payload.clone())
            .collect()
    }

    /// Payload of each read record, in order.
    pub fn reads(&self) -> Vec<Vec<u8>> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.direction == Direction::Read)
            .map(|r| r.payload.clone())
            .collect()
    }
}

impl IoSink for CollectingSink {
    fn record(&self, record: IoRecord) {
        self.0.lock().unwrap().push(record);
    }
}

/// Registry with a single counting tool; returns the registry and its counter.
pub fn counting_registry(name: &'static str) -> (HandlerRegistry, Arc<AtomicUsize>) {
    let tool = CountingTool::new(name);
    let counter = tool.counter();
    let mut registry = HandlerRegistry::new();
    registry.register_tool(Arc::new(tool)).unwrap();
    (registry, counter)
}

/// Registry with every OOSA tool and resource over the built-in catalogue.
pub fn default_registry() -> HandlerRegistry {
    let backend = Backend::open(None).unwrap();
    HandlerRegistry::with_defaults(Arc::new(backend)).unwrap()
}

pub fn default_handler() -> ProtocolHandler {
    ProtocolHandler::new(default_registry().freeze())
}

// ─────────────────────── messages ───────────────────────

/// Build an MCP JSON-RPC request.
pub fn mcp_request(id: i64, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params
    })
}

pub fn init_request() -> Value {
    mcp_request(
        0,
        "initialize",
        json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": { "name": "test-client", "version": "1.0" }
        }),
    )
}

pub fn tool_call(id: i64, name: &str, arguments: Value) -> Value {
    mcp_request(id, "tools/call", json!({ "name": name, "arguments": arguments }))
}

/// Newline-delimited wire form of a sequence of messages.
pub fn lines(messages: &[Value]) -> Vec<u8> {
    let mut out = Vec::new();
    for msg in messages {
        out.extend_from_slice(msg.to_string().as_bytes());
        out.push(b'\n');
    }
    out
}

/// Parse newline-delimited output back into JSON values.
pub fn parse_lines(bytes: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(bytes)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

/// Send a JSON-RPC message through the handler and return the response.
pub async fn send(handler: &ProtocolHandler, msg: Value) -> Option<Value> {
    let parsed: JsonRpcMessage = serde_json::from_value(msg).unwrap();
    handler.handle_message(parsed, &CancellationToken::new()).await
}

pub async fn send_unwrap(handler: &ProtocolHandler, msg: Value) -> Value {
    send(handler, msg).await.expect("expected response")
}

/// Text of the first content item in a tool call response.
pub fn tool_text(response: &Value) -> &str {
    response["result"]["content"][0]["text"].as_str().unwrap()
}
