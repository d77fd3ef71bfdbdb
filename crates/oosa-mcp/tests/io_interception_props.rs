//! Property tests: command logging never changes what the stdio runner
//! reads or writes, however the input is framed or chunked.

mod common;

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use oosa_mcp::transport::{io_log, Direction, StdioTransport};

use common::*;

/// One input frame: a valid ping, a notification, or arbitrary bytes.
fn frame_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        any::<i64>().prop_map(|id| mcp_request(id, "ping", json!({})).to_string().into_bytes()),
        Just(b"{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}".to_vec()),
        prop::collection::vec(any::<u8>(), 0..64),
    ]
}

/// Frames joined by newlines, with or without a trailing one.
fn input_strategy() -> impl Strategy<Value = Vec<u8>> {
    (prop::collection::vec(frame_strategy(), 0..8), any::<bool>()).prop_map(
        |(frames, trailing)| {
            let mut input = frames.join(&b'\n');
            if trailing {
                input.push(b'\n');
            }
            input
        },
    )
}

fn run(input: Vec<u8>, chunk: usize) -> (Vec<u8>, Vec<u8>, Arc<CollectingSink>) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    runtime.block_on(async move {
        let plain_transport = StdioTransport::new(default_handler());
        let mut plain: Vec<u8> = Vec::new();
        plain_transport
            .serve(&input[..], &mut plain, CancellationToken::new())
            .await
            .unwrap();

        let mut builder = tokio_test::io::Builder::new();
        for piece in input.chunks(chunk) {
            builder.read(piece);
        }
        let sink = Arc::new(CollectingSink::default());
        let mut logged: Vec<u8> = Vec::new();
        let (reader, writer) = io_log::intercept(builder.build(), &mut logged, sink.clone());
        StdioTransport::new(default_handler())
            .serve(reader, writer, CancellationToken::new())
            .await
            .unwrap();

        (plain, logged, sink)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: intercepted output is byte-identical to uninterrupted output,
    /// and the sink sees exactly the bytes that crossed each stream.
    #[test]
    fn prop_interception_is_transparent(input in input_strategy(), chunk in 1usize..48) {
        let (plain, logged, sink) = run(input.clone(), chunk);

        prop_assert_eq!(&plain, &logged);
        prop_assert_eq!(sink.bytes(Direction::Read), input);
        prop_assert_eq!(sink.bytes(Direction::Write), logged);
    }
}
