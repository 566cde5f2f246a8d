//! Streamed body delivery through the client
//!
//! Covers cancellation, mid-stream failures and concurrent independent streams.

use std::{error::Error as _, sync::Arc};

use asynchttp::{
    mock::{MockReply, MockTransport},
    AsyncHttp, BodyMode, Error, Method, Request,
};
use futures::{StreamExt, TryStreamExt};

#[derive(Debug, thiserror::Error)]
#[error("connection reset by peer")]
struct ConnectionReset;

fn sse_reply() -> MockReply {
    MockReply::status(200)
        .header("Content-Type", "text/event-stream")
        .chunks(vec![
            "event: message\r\n",
            "data: {\"id\": 1}\r\n\r\n",
            "event: message\r\nda",
            "ta: {\"id\": 2}\r\n\r\n",
        ])
}

#[tokio::test]
async fn test_server_sent_events_are_split_into_lines() {
    let client = AsyncHttp::new(MockTransport::replying(sse_reply()));
    let request = Request::get("https://example.com/events").unwrap();

    let (stream, response) = client.bytes(&request).await.unwrap();
    let lines: Vec<String> = stream.lines().try_collect().await.unwrap();

    assert_eq!(response.header("content-type"), Some("text/event-stream"));
    assert_eq!(
        lines,
        vec![
            "event: message",
            "data: {\"id\": 1}",
            "",
            "event: message",
            "data: {\"id\": 2}",
            "",
        ]
    );
}

#[tokio::test]
async fn test_bytes_returns_after_first_chunk() {
    let transport = MockTransport::replying(
        MockReply::status(200).chunks(vec!["one", "two", "three"]),
    );
    let client = AsyncHttp::new(transport.clone());

    let (stream, _) = client
        .bytes(&Request::get("https://example.com/chunks").unwrap())
        .await
        .unwrap();

    assert_eq!(transport.delivered_chunks(), 1);
    assert_eq!(stream.remaining(), b"one");
    drop(stream);
    assert_eq!(transport.delivered_chunks(), 1);
}

#[tokio::test]
async fn test_dropping_stream_releases_source_once() {
    let chunks: Vec<Vec<u8>> = (0..100).map(|i| vec![i as u8; 1024]).collect();
    let transport = MockTransport::replying(MockReply::status(200).chunks(chunks));
    let client = AsyncHttp::new(transport.clone());

    let (mut stream, _) = client
        .bytes(&Request::get("https://example.com/large").unwrap())
        .await
        .unwrap();

    for _ in 0..1500 {
        stream.next().await.unwrap().unwrap();
    }
    assert_eq!(transport.delivered_chunks(), 2);
    assert_eq!(transport.closes(), 0);

    drop(stream);
    assert_eq!(transport.closes(), 1);
    assert_eq!(transport.delivered_chunks(), 2);
}

#[tokio::test]
async fn test_dropping_lines_releases_source() {
    let transport = MockTransport::replying(sse_reply());
    let client = AsyncHttp::new(transport.clone());

    let (stream, _) = client
        .bytes(&Request::get("https://example.com/events").unwrap())
        .await
        .unwrap();
    let mut lines = stream.lines();
    assert_eq!(lines.next().await.unwrap().unwrap(), "event: message");

    drop(lines);
    assert_eq!(transport.closes(), 1);
}

#[tokio::test]
async fn test_stream_failure_is_surfaced_verbatim() {
    let transport = MockTransport::replying(
        MockReply::status(200)
            .chunk("partial line")
            .fail_stream(|| ConnectionReset),
    );
    let client = AsyncHttp::new(transport.clone());

    let (stream, _) = client
        .bytes(&Request::get("https://example.com/reset").unwrap())
        .await
        .unwrap();
    let mut lines = stream.lines();

    let error = lines.next().await.unwrap().unwrap_err();
    assert!(error.downcast_ref::<ConnectionReset>().is_some());
    assert!(lines.next().await.is_none());
    assert_eq!(transport.closes(), 1);
}

#[tokio::test]
async fn test_failure_before_first_chunk_is_a_network_error() {
    let transport = MockTransport::replying(MockReply::status(200).fail_stream(|| ConnectionReset));
    let client = AsyncHttp::new(transport.clone());
    let request = Request::get("https://example.com/reset").unwrap();

    let error = client.bytes(&request).await.unwrap_err();

    assert!(error.is_network());
    assert!(error.source().unwrap().downcast_ref::<ConnectionReset>().is_some());
    assert_eq!(transport.closes(), 1);
}

#[tokio::test]
async fn test_buffered_failure_mid_body_is_a_network_error() {
    let transport = MockTransport::replying(
        MockReply::status(200)
            .chunk("first")
            .fail_stream(|| ConnectionReset),
    );
    let client = AsyncHttp::new(transport.clone());

    let error = client
        .data(&Request::get("https://example.com/reset").unwrap())
        .await
        .unwrap_err();

    assert!(matches!(error, Error::NetworkRequestFailed { .. }));
    assert_eq!(transport.closes(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_streams_are_independent() {
    let mut transport = MockTransport::new();
    for id in 0..8 {
        let chunks: Vec<String> = (0..20).map(|n| format!("stream {id} line {n}\n")).collect();
        transport = transport.route(
            format!("https://example.com/stream/{id}"),
            MockReply::status(200).chunks(chunks).yield_between_chunks(),
        );
    }
    let client = Arc::new(AsyncHttp::new(transport.clone()));

    let handles: Vec<_> = (0..8)
        .map(|id| {
            let client = client.clone();
            tokio::spawn(async move {
                let request = Request::get(&format!("https://example.com/stream/{id}")).unwrap();
                let (stream, _) = client.bytes(&request).await.unwrap();
                let lines: Vec<String> = stream.lines().try_collect().await.unwrap();
                (id, lines)
            })
        })
        .collect();

    for handle in handles {
        let (id, lines) = handle.await.unwrap();
        let expected: Vec<String> = (0..20).map(|n| format!("stream {id} line {n}")).collect();
        assert_eq!(lines, expected);
    }
    assert_eq!(transport.closes(), 8);
    assert_eq!(transport.requests().len(), 8);
}

#[tokio::test]
async fn test_every_method_reaches_the_transport() {
    let transport = MockTransport::replying(MockReply::status(204));
    let client = AsyncHttp::new(transport.clone());

    for method in Method::ALL {
        let request = Request::parse(method, "https://example.com/resource").unwrap();
        let (body, response) = client.fetch(&request, BodyMode::Buffered).await.unwrap();
        assert_eq!(response.status_code, 204);
        assert!(body.into_buffered().unwrap().is_empty());
    }

    let methods: Vec<Method> = transport.requests().iter().map(|r| r.method).collect();
    assert_eq!(methods, Method::ALL.to_vec());
}

#[tokio::test]
async fn test_status_codes_are_returned_not_raised() {
    for status in [200u16, 201, 204, 301, 400, 401, 404, 500, 503] {
        let client = AsyncHttp::new(MockTransport::replying(
            MockReply::status(status).body("status body"),
        ));
        let (data, response) = client
            .data(&Request::get("https://example.com/status").unwrap())
            .await
            .unwrap();

        assert_eq!(response.status_code, status);
        assert_eq!(&data[..], b"status body");
    }
}
