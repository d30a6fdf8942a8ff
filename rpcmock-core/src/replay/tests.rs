//! Tests for loading and replaying capture logs

use super::*;
use crate::document::Document;
use crate::error::MockError;
use crate::record::{Record, SEPARATOR, encode_record};
use crate::rpc::{self, CallContext, ClientConn, MockServer, ServiceMethod};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct EchoMessage {
    msg: String,
}

fn write_log(dir: &TempDir, records: &[Record]) -> PathBuf {
    let path = dir.path().join("capture.log");
    let mut text = String::new();
    for record in records {
        text.push_str(&encode_record(record).unwrap());
    }
    std::fs::write(&path, text).unwrap();
    path
}

fn echo(msg: &str) -> Record {
    Record::new(
        "ExampleService",
        "Echo",
        Document::from(json!({"msg": msg})),
        Document::from(json!({"msg": msg})),
    )
}

#[test]
fn test_load_groups_by_key_in_order() {
    let dir = TempDir::new().unwrap();
    let records = vec![
        echo("a"),
        Record::new("Other", "Ping", Document::Null, Document::Null),
        echo("b"),
        echo("c"),
    ];
    let path = write_log(&dir, &records);

    let index = MatchIndex::load(&path).unwrap();

    assert_eq!(index.len(), 4);
    assert_eq!(index.key_count(), 2);
    assert_eq!(index.keys(), vec!["ExampleService/Echo", "Other/Ping"]);

    let echoes: Vec<Document> = index
        .candidates("ExampleService/Echo")
        .unwrap()
        .iter()
        .map(|c| c.record.request.clone())
        .collect();
    assert_eq!(
        echoes,
        vec![
            Document::from(json!({"msg": "a"})),
            Document::from(json!({"msg": "b"})),
            Document::from(json!({"msg": "c"})),
        ]
    );
}

#[test]
fn test_missing_file_is_file_error() {
    let dir = TempDir::new().unwrap();
    let err = MatchIndex::load(dir.path().join("absent.log")).unwrap_err();
    assert!(matches!(err, MockError::File { .. }));
}

#[test]
fn test_relative_path_resolves_against_cwd() {
    let dir = tempfile::Builder::new()
        .prefix("rpcmock-relative")
        .tempdir_in(".")
        .unwrap();
    write_log(&dir, &[echo("rel")]);
    let relative = PathBuf::from(dir.path().file_name().unwrap()).join("capture.log");
    assert!(relative.is_relative());

    let index = MatchIndex::load(&relative).unwrap();
    assert_eq!(index.len(), 1);
}

#[test]
fn test_malformed_log_returns_no_index() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.log");
    let good = encode_record(&echo("a")).unwrap();
    std::fs::write(&path, format!("{good}{{\"service\": {SEPARATOR}{good}")).unwrap();

    let err = Replayer::from_path(&path).unwrap_err();
    assert!(matches!(err, MockError::Parse { chunk: 1, .. }));
}

#[test]
fn test_empty_chunk_between_records_fails_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gap.log");
    let good = encode_record(&echo("a")).unwrap();
    std::fs::write(&path, format!("{good}{SEPARATOR}{good}")).unwrap();

    let err = MatchIndex::load(&path).unwrap_err();
    match err {
        MockError::Parse { chunk, offset, .. } => {
            assert_eq!(chunk, 1);
            assert_eq!(offset, good.len());
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_serve_replays_captured_response() {
    let dir = TempDir::new().unwrap();
    let path = write_log(&dir, &[echo("hi")]);
    let replayer = Replayer::from_path(&path).unwrap();

    let out = replayer
        .serve(&CallContext::new(), "ExampleService", "Echo", br#"{"msg":"hi"}"#)
        .await
        .unwrap();
    assert_eq!(
        Document::from_slice(&out).unwrap(),
        Document::from(json!({"msg": "hi"}))
    );
}

#[tokio::test]
async fn test_invoke_typed_echo() {
    let replayer = Replayer::new(MatchIndex::from_records(vec![echo("hi")]));
    let ctx = CallContext::new();

    let mut reply = EchoMessage::default();
    rpc::invoke(
        &replayer,
        &ctx,
        "/example.ExampleService/Echo",
        &EchoMessage { msg: "hi".into() },
        &mut reply,
    )
    .await
    .unwrap();
    assert_eq!(reply.msg, "hi");

    let err = rpc::invoke(
        &replayer,
        &ctx,
        "/example.ExampleService/Echo",
        &EchoMessage { msg: "bye".into() },
        &mut reply,
    )
    .await
    .unwrap_err();
    assert!(err.is_no_match());
}

#[tokio::test]
async fn test_invoke_null_response_leaves_reply_untouched() {
    let replayer = Replayer::new(MatchIndex::from_records(vec![Record::new(
        "ExampleService",
        "Fire",
        Document::Null,
        Document::Null,
    )]));

    let mut reply = EchoMessage {
        msg: "unchanged".into(),
    };
    rpc::invoke(
        &replayer,
        &CallContext::new(),
        "/example.ExampleService/Fire",
        &EchoMessage { msg: "x".into() },
        &mut reply,
    )
    .await
    .unwrap();
    assert_eq!(reply.msg, "unchanged");
}

#[tokio::test]
async fn test_invoke_configured_error() {
    let replayer = Replayer::new(MatchIndex::from_records(vec![
        echo("hi").with_error("rpc error: code = PermissionDenied desc = nope"),
    ]));

    let mut reply = EchoMessage::default();
    let err = rpc::invoke(
        &replayer,
        &CallContext::new(),
        "/example.ExampleService/Echo",
        &EchoMessage { msg: "hi".into() },
        &mut reply,
    )
    .await
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "rpc error: code = PermissionDenied desc = nope"
    );
    assert_eq!(reply, EchoMessage::default());
}

#[tokio::test]
async fn test_unparsable_method_path_uses_error_key() {
    let replayer = Replayer::new(MatchIndex::from_records(vec![echo("hi")]));

    let err = replayer
        .invoke(&CallContext::new(), "garbage", &Document::Null)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "could not find request for: error/error");
}

#[test]
fn test_streaming_fails_fast() {
    let replayer = Replayer::new(MatchIndex::default());
    let result = replayer.new_stream(&CallContext::new(), "/example.ExampleService/Watch");
    assert!(matches!(result, Err(MockError::Unsupported(_))));
}

#[test]
fn test_match_document_by_service_method() {
    let replayer = Replayer::new(MatchIndex::from_records(vec![echo("hi")]));
    let out = replayer
        .match_document(
            &ServiceMethod::new("ExampleService", "Echo"),
            &Document::from(json!({"msg": "hi"})),
        )
        .unwrap();
    assert_eq!(out, Document::from(json!({"msg": "hi"})));
}

#[tokio::test(start_paused = true)]
async fn test_delay_bounds() {
    let replayer = Replayer::new(MatchIndex::from_records(vec![echo("hi")]))
        .with_delay(Duration::from_millis(10), Duration::from_millis(50));
    let ctx = CallContext::new();

    for _ in 0..100 {
        let start = tokio::time::Instant::now();
        replayer
            .serve(&ctx, "ExampleService", "Echo", br#"{"msg":"hi"}"#)
            .await
            .unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(10), "too fast: {elapsed:?}");
        // Paused timers fire on whole-millisecond ticks.
        assert!(elapsed <= Duration::from_millis(50), "too slow: {elapsed:?}");
    }

    for _ in 0..100 {
        let start = tokio::time::Instant::now();
        let slept = replayer.delay().wait().await;
        assert!(slept >= Duration::from_millis(10), "too short: {slept:?}");
        assert!(slept < Duration::from_millis(50), "too long: {slept:?}");
        assert!(start.elapsed() >= slept);
    }
}

#[tokio::test(start_paused = true)]
async fn test_delay_applies_to_misses() {
    let replayer = Replayer::new(MatchIndex::default())
        .with_delay(Duration::from_millis(20), Duration::from_millis(30));

    let start = tokio::time::Instant::now();
    let err = replayer
        .serve(&CallContext::new(), "S", "M", b"{}")
        .await
        .unwrap_err();
    assert!(err.is_no_match());
    assert!(start.elapsed() >= Duration::from_millis(20));
}

#[test]
fn test_builder_loads_with_delay() {
    let dir = TempDir::new().unwrap();
    let path = write_log(&dir, &[echo("hi")]);

    let replayer = Replayer::builder(&path)
        .min_delay(Duration::from_millis(5))
        .max_delay(Duration::from_millis(15))
        .build()
        .unwrap();

    assert!(replayer.delay().is_enabled());
    assert_eq!(replayer.delay().min(), Duration::from_millis(5));
    assert_eq!(replayer.index().len(), 1);
}
