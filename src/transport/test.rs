use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::io::{self, Cursor};
use std::pin::Pin;
use std::sync::Mutex;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, ReadBuf};
use tracing_subscriber::EnvFilter;

use crate::error::Error;
use crate::logging::{subscriber, CapturedLog};
use crate::protocol::{Request, Response};
use crate::server::ServerBuilder;
use crate::transport::{run, stdio::StdioTransport, Dispatch};

/// Runs the full loop over `input` against the default server and returns the
/// raw bytes written to the output stream.
async fn serve(input: &str) -> String {
    let server = ServerBuilder::new().build().unwrap();
    let mut output = Vec::new();
    let mut transport =
        StdioTransport::with_streams(Cursor::new(input.as_bytes().to_vec()), &mut output);
    run(&mut transport, &server).await.unwrap();
    drop(transport);
    String::from_utf8(output).unwrap()
}

fn parse_lines(output: &str) -> Vec<Value> {
    output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

/// Records every dispatched method and answers with an empty result.
#[derive(Default)]
struct RecordingDispatcher {
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl Dispatch for RecordingDispatcher {
    async fn dispatch(&self, request: Request) -> Option<Response> {
        self.seen.lock().unwrap().push(request.method.clone());
        Some(Response::success(request.id, json!({})))
    }
}

/// A stream whose every read and write fails.
struct BrokenPipe;

impl AsyncRead for BrokenPipe {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
    }
}

impl AsyncWrite for BrokenPipe {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

#[tokio::test]
async fn add_scenario_produces_exact_line() {
    let output = serve(
        r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"add","arguments":{"a":2,"b":3}}}"#,
    )
    .await;
    assert_eq!(
        output,
        "{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{\"content\":[{\"type\":\"text\",\"text\":\"Result: 5.00\"}]}}\n"
    );
}

#[tokio::test]
async fn divide_by_zero_is_a_successful_result() {
    let output = serve(
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"divide","arguments":{"a":1,"b":0}}}"#,
    )
    .await;
    let responses = parse_lines(&output);
    assert_eq!(responses.len(), 1);
    assert_eq!(
        responses[0]["result"]["content"][0]["text"],
        json!("Error: Cannot divide by zero")
    );
    assert!(responses[0].get("error").is_none());
}

#[tokio::test]
async fn unknown_tool_is_invalid_params() {
    let output = serve(
        r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"mod","arguments":{"a":1,"b":2}}}"#,
    )
    .await;
    let responses = parse_lines(&output);
    assert_eq!(responses[0]["id"], json!(3));
    assert_eq!(responses[0]["error"]["code"], json!(-32602));
}

#[tokio::test]
async fn notifications_and_blank_lines_produce_no_output() {
    let input = concat!(
        "{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n",
        "\n",
        "   \n",
        "{\"jsonrpc\":\"2.0\",\"id\":9,\"method\":\"notifications/cancelled\"}\n",
    );
    assert_eq!(serve(input).await, "");
}

#[tokio::test]
async fn loop_continues_past_malformed_lines() {
    let input = concat!(
        "{this is not json\n",
        "{\"jsonrpc\":\"2.0\",\"params\":{}}\n",
        "{\"jsonrpc\":\"2.0\",\"id\":\"x\"}\n",
        "{\"jsonrpc\":\"2.0\",\"id\":4,\"method\":\"resources/list\"}\n",
    );
    let responses = parse_lines(&serve(input).await);
    assert_eq!(
        responses,
        vec![
            json!({
                "jsonrpc": "2.0",
                "id": "x",
                "error": {"code": -32600, "message": "Invalid Request: missing 'method'"}
            }),
            json!({"jsonrpc": "2.0", "id": 4, "result": {"resources": []}}),
        ]
    );
}

#[tokio::test]
async fn one_line_per_request_in_order() {
    let input = concat!(
        "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"initialize\",\"params\":{}}\n",
        "{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n",
        "{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"tools/list\"}\n",
        "{\"jsonrpc\":\"2.0\",\"id\":3,\"method\":\"bogus\"}\n",
    );
    let responses = parse_lines(&serve(input).await);
    let ids: Vec<Value> = responses.iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids, vec![json!(1), json!(2), json!(3)]);
    assert_eq!(responses[2]["error"]["code"], json!(-32601));
    assert!(responses[2].get("result").is_none());
}

#[tokio::test]
async fn dispatcher_sees_only_decoded_requests() {
    let dispatcher = RecordingDispatcher::default();
    let input = "garbage\n{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"a\"}\n\n{\"method\":\"b\"}\n";
    let mut output = Vec::new();
    let mut transport =
        StdioTransport::with_streams(Cursor::new(input.as_bytes().to_vec()), &mut output);

    run(&mut transport, &dispatcher).await.unwrap();
    drop(transport);

    assert_eq!(*dispatcher.seen.lock().unwrap(), vec!["a", "b"]);
    assert_eq!(output.iter().filter(|&&b| b == b'\n').count(), 2);
}

#[tokio::test]
async fn read_fault_ends_the_loop_after_earlier_responses() {
    let log = CapturedLog::default();
    let _guard = tracing::subscriber::set_default(subscriber(EnvFilter::new("info"), log.clone()));

    let server = ServerBuilder::new().build().unwrap();
    let input = (&b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"prompts/list\"}\n"[..]).chain(BrokenPipe);
    let mut output = Vec::new();
    let mut transport = StdioTransport::with_streams(input, &mut output);

    let result = run(&mut transport, &server).await;
    drop(transport);

    assert!(matches!(result, Err(Error::Io(_))), "{result:?}");
    assert_eq!(
        parse_lines(&String::from_utf8(output).unwrap()),
        vec![json!({"jsonrpc": "2.0", "id": 1, "result": {"prompts": []}})]
    );
    let contents = log.contents();
    assert!(contents.contains("Error reading from input stream"), "{contents}");
    assert!(!contents.contains("Input stream closed"), "{contents}");
}

#[tokio::test]
async fn write_fault_ends_the_loop() {
    let log = CapturedLog::default();
    let _guard = tracing::subscriber::set_default(subscriber(EnvFilter::new("info"), log.clone()));

    let server = ServerBuilder::new().build().unwrap();
    let input = concat!(
        "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"tools/list\"}\n",
        "{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"tools/list\"}\n",
    );
    let mut transport =
        StdioTransport::with_streams(Cursor::new(input.as_bytes().to_vec()), BrokenPipe);

    let result = run(&mut transport, &server).await;

    assert!(matches!(result, Err(Error::Io(_))), "{result:?}");
    let contents = log.contents();
    assert_eq!(contents.matches("Error writing response").count(), 1, "{contents}");
}

#[tokio::test]
async fn dropped_messages_name_the_reason() {
    let log = CapturedLog::default();
    let _guard = tracing::subscriber::set_default(subscriber(EnvFilter::new("info"), log.clone()));

    let input = concat!(
        "{\"jsonrpc\":\"2.0\",\"id\":true,\"method\":\"tools/list\"}\n",
        "{\"jsonrpc\":\"2.0\",\"id\":{\"n\":1},\"method\":\"tools/list\"}\n",
    );
    assert_eq!(serve(input).await, "");

    let contents = log.contents();
    assert_eq!(contents.matches("unsupported id type").count(), 2, "{contents}");
}
