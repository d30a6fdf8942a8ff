//! Tests for capture writing and interception

use super::*;
use crate::document::Document;
use crate::error::{MockError, Result};
use crate::record::read_log;
use crate::replay::MatchIndex;
use crate::rpc::{CallContext, ClientConn, DocumentStream};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

/// Echoes the request back; fails for methods named `Fail`
struct EchoConn;

#[async_trait]
impl ClientConn for EchoConn {
    async fn invoke(
        &self,
        _ctx: &CallContext,
        full_method: &str,
        args: &Document,
    ) -> Result<Document> {
        if full_method.ends_with("/Fail") {
            return Err(MockError::Other("backend unavailable".to_string()));
        }
        Ok(args.clone())
    }

    fn new_stream(&self, _ctx: &CallContext, _full_method: &str) -> Result<DocumentStream> {
        Ok(Box::pin(futures::stream::empty()))
    }
}

fn read_records(path: &std::path::Path) -> Vec<crate::record::Record> {
    read_log(std::fs::File::open(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_writer_appends_in_queue_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("capture.log");
    let writer = CaptureWriter::create(&path).unwrap();

    for i in 0..5 {
        writer.capture(
            "ExampleService",
            "Echo",
            Document::from(json!({"n": i})),
            Document::from(json!({"n": i})),
            None,
        );
    }
    writer.drain().await.unwrap();

    let records = read_records(&path);
    assert_eq!(records.len(), 5);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.request, Document::from(json!({"n": i})));
        assert!(record.captured_at.is_some());
        assert!(!record.is_failure());
    }

    assert_eq!(writer.close().await.unwrap(), 5);
}

#[tokio::test]
async fn test_close_is_idempotent_and_later_captures_are_dropped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("capture.log");
    let writer = CaptureWriter::create(&path).unwrap();

    writer.capture("S", "M", Document::Null, Document::Null, Some("boom"));
    assert_eq!(writer.close().await.unwrap(), 1);
    assert_eq!(writer.close().await.unwrap(), 0);

    writer.capture("S", "M", Document::Null, Document::Null, None);
    writer.drain().await.unwrap();

    let records = read_records(&path);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].error, "boom");
}

#[tokio::test]
async fn test_create_in_missing_directory_is_file_error() {
    let dir = TempDir::new().unwrap();
    let result = CaptureWriter::create(dir.path().join("no/such/dir/capture.log"));
    assert!(matches!(result, Err(MockError::File { .. })));
}

#[test]
fn test_create_outside_runtime_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("capture.log");

    let err = CaptureWriter::create(&path).err().unwrap();
    assert!(matches!(err, MockError::Configuration(_)));

    let err = Recorder::new(&path).err().unwrap();
    assert!(matches!(err, MockError::Configuration(_)));
    assert!(!path.exists());
}

#[tokio::test]
async fn test_concurrent_captures_never_interleave() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("capture.log");
    let writer = Arc::new(CaptureWriter::create(&path).unwrap());

    let mut handles = Vec::new();
    for task in 0..8 {
        let writer = writer.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..25 {
                writer.capture(
                    "Load",
                    "Put",
                    Document::from(json!({"task": task, "i": i, "pad": "x".repeat(512)})),
                    Document::Null,
                    None,
                );
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(writer.close().await.unwrap(), 200);

    let index = MatchIndex::load(&path).unwrap();
    assert_eq!(index.len(), 200);

    // Log order is some serialization of the calls; within one task it
    // follows call order.
    let per_task: Vec<Vec<i64>> = (0..8)
        .map(|task| {
            index
                .candidates("Load/Put")
                .unwrap()
                .iter()
                .filter(|c| c.record.request.get("task") == Some(&Document::from(json!(task))))
                .map(|c| match c.record.request.get("i") {
                    Some(Document::Number(n)) => n.as_i64().unwrap(),
                    other => panic!("unexpected index {other:?}"),
                })
                .collect()
        })
        .collect();
    for seen in per_task {
        assert_eq!(seen, (0..25).collect::<Vec<i64>>());
    }
}

#[tokio::test]
async fn test_empty_path_is_pass_through() {
    let recorder = Recorder::new("").unwrap();
    assert!(!recorder.is_enabled());

    let reply: std::result::Result<i32, String> = recorder
        .intercept("/pkg.S/M", &json!({}), || async { Ok(7) })
        .await;
    assert_eq!(reply, Ok(7));
    assert_eq!(recorder.close().await.unwrap(), 0);
}

#[tokio::test]
async fn test_intercept_records_success_and_failure() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("capture.log");
    let recorder = Recorder::new(&path).unwrap();

    let ok: std::result::Result<serde_json::Value, String> = recorder
        .intercept("/example.ExampleService/Echo", &json!({"msg": "hi"}), || async {
            Ok(json!({"msg": "hi"}))
        })
        .await;
    assert!(ok.is_ok());

    let failed: std::result::Result<serde_json::Value, String> = recorder
        .intercept("/example.ExampleService/Echo", &json!({"msg": "bad"}), || async {
            Err("rpc error: code = InvalidArgument".to_string())
        })
        .await;
    assert_eq!(failed.unwrap_err(), "rpc error: code = InvalidArgument");

    recorder.close().await.unwrap();

    let records = read_records(&path);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].service, "ExampleService");
    assert_eq!(records[0].method, "Echo");
    assert_eq!(records[0].response, Document::from(json!({"msg": "hi"})));
    assert_eq!(records[1].error, "rpc error: code = InvalidArgument");
    assert!(records[1].response.is_null());
}

#[tokio::test]
async fn test_unparsable_method_is_recorded_under_error_key() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("capture.log");
    let recorder = Recorder::new(&path).unwrap();

    let _: std::result::Result<i32, String> = recorder
        .intercept("not-a-method", &json!(null), || async { Ok(1) })
        .await;
    recorder.close().await.unwrap();

    let records = read_records(&path);
    assert_eq!(records[0].key(), "error/error");
}

#[tokio::test]
async fn test_recording_conn_captures_and_passes_through() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("capture.log");
    let recorder = Recorder::new(&path).unwrap();
    let conn = recorder.wrap(EchoConn);
    let ctx = CallContext::new();

    let out = conn
        .invoke(&ctx, "/example.ExampleService/Echo", &Document::from(json!({"msg": "a"})))
        .await
        .unwrap();
    assert_eq!(out, Document::from(json!({"msg": "a"})));

    let err = conn
        .invoke(&ctx, "/example.ExampleService/Fail", &Document::from(json!({})))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "backend unavailable");

    assert!(conn.new_stream(&ctx, "/example.ExampleService/Watch").is_ok());

    assert_eq!(conn.recorder().close().await.unwrap(), 2);
    let records = read_records(&path);
    assert_eq!(records[0].key(), "ExampleService/Echo");
    assert_eq!(records[1].key(), "ExampleService/Fail");
    assert_eq!(records[1].error, "backend unavailable");
}
