//! Stdio runner: ordering, framing, error propagation, cancellation, and
//! command logging.

mod common;

use std::io;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use oosa_mcp::protocol::ProtocolHandler;
use oosa_mcp::transport::{Direction, StdioTransport};
use oosa_mcp::types::*;
use oosa_mcp::HandlerRegistry;

use common::*;

fn transport() -> StdioTransport {
    StdioTransport::new(default_handler())
}

async fn serve_bytes(transport: &StdioTransport, input: &[u8]) -> McpResult<Vec<u8>> {
    let mut output: Vec<u8> = Vec::new();
    transport
        .serve(input, &mut output, CancellationToken::new())
        .await?;
    Ok(output)
}

#[tokio::test]
async fn test_responses_match_requests_in_order() {
    let mut requests = vec![init_request()];
    for id in 1..=5 {
        requests.push(mcp_request(id, "ping", json!({})));
    }
    requests.push(tool_call(6, "get_ideas", json!({})));

    let output = serve_bytes(&transport(), &lines(&requests)).await.unwrap();
    let responses = parse_lines(&output);

    assert_eq!(responses.len(), requests.len());
    for (request, response) in requests.iter().zip(&responses) {
        assert_eq!(request["id"], response["id"]);
    }
}

#[tokio::test]
async fn test_notifications_and_blank_lines_are_silent() {
    let mut input = lines(&[
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        mcp_request(1, "ping", json!({})),
    ]);
    input.extend_from_slice(b"\n   \r\n");
    input.extend_from_slice(&lines(&[mcp_request(2, "ping", json!({}))]));

    let output = serve_bytes(&transport(), &input).await.unwrap();
    let responses = parse_lines(&output);

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[1]["id"], 2);
}

#[tokio::test]
async fn test_malformed_line_yields_parse_error_and_continues() {
    let mut input = b"{not json}\n".to_vec();
    input.extend_from_slice(&[0xff, 0xfe, b'\n']);
    input.extend_from_slice(&lines(&[mcp_request(3, "ping", json!({}))]));

    let output = serve_bytes(&transport(), &input).await.unwrap();
    let responses = parse_lines(&output);

    assert_eq!(responses.len(), 3);
    for parse_error in &responses[..2] {
        assert!(parse_error["id"].is_null());
        assert_eq!(parse_error["error"]["code"], error_codes::PARSE_ERROR);
    }
    assert_eq!(responses[2]["id"], 3);
}

#[tokio::test]
async fn test_last_line_without_newline_is_served() {
    let input = mcp_request(1, "ping", json!({})).to_string();
    let output = serve_bytes(&transport(), input.as_bytes()).await.unwrap();
    assert_eq!(parse_lines(&output).len(), 1);
    assert!(output.ends_with(b"\n"));
}

#[tokio::test]
async fn test_empty_input_ends_cleanly() {
    let output = serve_bytes(&transport(), b"").await.unwrap();
    assert!(output.is_empty());
}

#[tokio::test]
async fn test_read_error_is_returned() {
    let first = lines(&[mcp_request(1, "ping", json!({}))]);
    let reader = tokio_test::io::Builder::new()
        .read(&first)
        .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "peer gone"))
        .build();

    let mut output: Vec<u8> = Vec::new();
    let err = transport()
        .serve(reader, &mut output, CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, McpError::Io(ref e) if e.kind() == io::ErrorKind::ConnectionReset));
    assert_eq!(parse_lines(&output).len(), 1);
}

#[tokio::test]
async fn test_write_error_is_returned() {
    let input = lines(&[mcp_request(1, "ping", json!({}))]);
    let writer = tokio_test::io::Builder::new()
        .write_error(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        .build();

    let err = transport()
        .serve(&input[..], writer, CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, McpError::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
}

#[tokio::test]
async fn test_cancelled_while_idle_reads_nothing() {
    let (registry, calls) = counting_registry("count");
    let transport = StdioTransport::new(ProtocolHandler::new(registry.freeze()));

    let (mut client, server) = tokio::io::duplex(4096);
    let ct = CancellationToken::new();
    ct.cancel();
    client
        .write_all(&lines(&[tool_call(1, "count", json!({}))]))
        .await
        .unwrap();

    let mut output: Vec<u8> = Vec::new();
    transport.serve(server, &mut output, ct).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(output.is_empty());
}

#[tokio::test]
async fn test_cancel_while_waiting_for_input_returns() {
    let (registry, calls) = counting_registry("count");
    let transport = StdioTransport::new(ProtocolHandler::new(registry.freeze()));

    // Keep the client end open so the runner blocks on input.
    let (_client, server) = tokio::io::duplex(4096);
    let ct = CancellationToken::new();
    let canceller = ct.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let mut output: Vec<u8> = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), transport.serve(server, &mut output, ct))
        .await
        .expect("runner should stop on cancellation")
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_in_flight_handler_finishes_after_cancel() {
    let tool = CountingTool::slow("slow", Duration::from_millis(100));
    let calls = tool.counter();
    let mut registry = HandlerRegistry::new();
    registry.register_tool(Arc::new(tool)).unwrap();
    let transport = StdioTransport::new(ProtocolHandler::new(registry.freeze()));

    let (mut client, server) = tokio::io::duplex(4096);
    client
        .write_all(&lines(&[
            tool_call(1, "slow", json!({})),
            tool_call(2, "slow", json!({})),
        ]))
        .await
        .unwrap();

    let ct = CancellationToken::new();
    let canceller = ct.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        canceller.cancel();
    });

    let mut output: Vec<u8> = Vec::new();
    transport.serve(server, &mut output, ct).await.unwrap();

    let responses = parse_lines(&output);
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_command_logging_keeps_bytes_identical() {
    let input = lines(&[
        init_request(),
        json!({"jsonrpc": "2.0", "method": "initialized"}),
        mcp_request(1, "tools/list", json!({})),
        tool_call(2, "search_attractions", json!({ "query": "北投" })),
        mcp_request(3, "resources/read", json!({ "uri": "oosa://attraction/taipei101" })),
    ]);

    let plain = serve_bytes(&transport(), &input).await.unwrap();

    let sink = Arc::new(CollectingSink::default());
    let mut logged: Vec<u8> = Vec::new();
    let (reader, writer) =
        oosa_mcp::transport::io_log::intercept(&input[..], &mut logged, sink.clone());
    transport()
        .serve(reader, writer, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(plain, logged);
    assert_eq!(sink.bytes(Direction::Read), input);
    assert_eq!(sink.bytes(Direction::Write), logged);
}

#[tokio::test]
async fn test_command_logging_toggle_does_not_change_output() {
    let input = lines(&[mcp_request(1, "ping", json!({})), mcp_request(2, "ping", json!({}))]);

    let mut plain: Vec<u8> = Vec::new();
    transport()
        .run_on(&input[..], &mut plain, CancellationToken::new())
        .await
        .unwrap();

    let mut logged: Vec<u8> = Vec::new();
    transport()
        .with_command_logging(true)
        .run_on(&input[..], &mut logged, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(plain, logged);
    assert_eq!(parse_lines(&logged).len(), 2);
}

#[tokio::test]
async fn test_command_logging_with_requests_split_across_reads() {
    let input = lines(&[
        mcp_request(1, "ping", json!({})),
        mcp_request(2, "tools/list", json!({})),
        mcp_request(3, "resources/read", json!({ "uri": "oosa://attraction/taipei101" })),
    ]);
    let (a, rest) = input.split_at(7);
    let (b, c) = rest.split_at(rest.len() / 2);

    let plain = serve_bytes(&transport(), &input).await.unwrap();

    let chunked = tokio_test::io::Builder::new().read(a).read(b).read(c).build();
    let sink = Arc::new(CollectingSink::default());
    let mut logged: Vec<u8> = Vec::new();
    let (reader, writer) =
        oosa_mcp::transport::io_log::intercept(chunked, &mut logged, sink.clone());
    transport()
        .serve(reader, writer, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(plain, logged);
    assert_eq!(parse_lines(&logged).len(), 3);
    assert_eq!(sink.bytes(Direction::Read), input);
    assert_eq!(sink.reads(), vec![a.to_vec(), b.to_vec(), c.to_vec()]);
    assert_eq!(sink.bytes(Direction::Write), logged);
}
