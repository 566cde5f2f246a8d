//! Property-based tests for body delivery and line decoding
//!
//! Chunk boundaries are an artifact of the transport, so nothing a caller observes
//! may depend on them.

use asynchttp::{
    mock::{MockReply, MockTransport},
    AsyncHttp, ByteStream, ClientConfig, Error, LineDecoder, Request,
};
use bytes::Bytes;
use futures::{stream, TryStreamExt};
use proptest::prelude::*;

/// Split `data` at the given cut points, keeping empty chunks where cuts repeat
fn split(data: &[u8], cuts: &[usize]) -> Vec<Vec<u8>> {
    let mut cuts: Vec<usize> = cuts.iter().map(|cut| cut % (data.len() + 1)).collect();
    cuts.sort_unstable();

    let mut chunks = Vec::new();
    let mut start = 0;
    for cut in cuts {
        chunks.push(data[start..cut].to_vec());
        start = cut;
    }
    chunks.push(data[start..].to_vec());
    chunks
}

fn arb_body() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..512)
}

fn arb_piece() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("\n"),
        Just("\r\n"),
        Just("a"),
        Just("data: x"),
        Just("é"),
        Just("日本"),
        Just("🦀"),
    ]
}

// Text made mostly of line terminators and multibyte characters
fn arb_text() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop_oneof![4 => arb_piece(), 1 => Just("\r")], 0..64)
        .prop_map(|parts| parts.concat().into_bytes())
}

// Same, without carriage returns outside CRLF pairs
fn arb_crlf_text() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(arb_piece(), 0..64).prop_map(|parts| parts.concat().into_bytes())
}

fn arb_cuts() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(any::<usize>(), 0..16)
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

async fn stream_lines(chunks: Vec<Vec<u8>>) -> Vec<String> {
    let source = stream::iter(
        chunks
            .into_iter()
            .map(|chunk| Ok::<_, std::io::Error>(Bytes::from(chunk))),
    );
    ByteStream::new(source).lines().try_collect().await.unwrap()
}

fn decode_whole(data: &[u8]) -> Vec<String> {
    let mut decoder = LineDecoder::new();
    let mut lines = Vec::new();
    decoder.push_slice(data, &mut lines);
    lines.extend(decoder.finish());
    lines
}

proptest! {
    #[test]
    fn prop_byte_stream_is_chunking_invariant(data in arb_body(), cuts in arb_cuts()) {
        let chunks = split(&data, &cuts);
        let source = stream::iter(
            chunks
                .into_iter()
                .map(|chunk| Ok::<_, std::io::Error>(Bytes::from(chunk))),
        );

        let collected: Vec<u8> = runtime()
            .block_on(ByteStream::new(source).try_collect())
            .unwrap();
        prop_assert_eq!(collected, data);
    }

    #[test]
    fn prop_buffered_body_is_concatenation(data in arb_body(), cuts in arb_cuts()) {
        let transport = MockTransport::replying(MockReply::status(200).chunks(split(&data, &cuts)));
        let client = AsyncHttp::new(transport.clone());
        let request = Request::get("https://example.com/body").unwrap();

        let (body, response) = runtime().block_on(client.data(&request)).unwrap();

        prop_assert_eq!(response.status_code, 200);
        prop_assert_eq!(&body[..], data.as_slice());
        prop_assert_eq!(transport.closes(), 1);
    }

    #[test]
    fn prop_lines_do_not_depend_on_chunk_boundaries(text in arb_text(), cuts in arb_cuts()) {
        let expected = decode_whole(&text);
        let lines = runtime().block_on(stream_lines(split(&text, &cuts)));
        prop_assert_eq!(lines, expected);
    }

    #[test]
    fn prop_lines_never_contain_line_feeds(text in arb_text(), cuts in arb_cuts()) {
        let lines = runtime().block_on(stream_lines(split(&text, &cuts)));
        for line in &lines {
            prop_assert!(!line.contains('\n'));
        }
    }

    #[test]
    fn prop_lines_match_std_lines_for_crlf_text(text in arb_crlf_text()) {
        let expected: Vec<String> = std::str::from_utf8(&text)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        prop_assert_eq!(decode_whole(&text), expected);
    }

    #[test]
    fn prop_body_cap_is_exact(len in 0usize..256, cap in 1usize..256, cuts in arb_cuts()) {
        let data = vec![0x2a; len];
        let transport = MockTransport::replying(MockReply::status(200).chunks(split(&data, &cuts)));
        let client = AsyncHttp::with_config(
            transport.clone(),
            ClientConfig::new().with_max_body_size(cap),
        )
        .unwrap();
        let request = Request::get("https://example.com/capped").unwrap();

        let result = runtime().block_on(client.data(&request));

        if len <= cap {
            prop_assert_eq!(result.unwrap().0.len(), len);
        } else {
            prop_assert!(matches!(result, Err(Error::BodyTooLarge { .. })), "expected BodyTooLarge error");
        }
        prop_assert_eq!(transport.closes(), 1);
    }
}
