//! Capture interception
//!
//! [`Recorder`] sits around real unary calls and hands each completed call to
//! a [`CaptureWriter`]. A recorder built from an empty path is disabled and
//! passes calls through untouched.

use super::writer::CaptureWriter;
use crate::config::CaptureSettings;
use crate::document::Document;
use crate::error::Result;
use crate::rpc::{CallContext, ClientConn, DocumentStream, ServiceMethod};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

/// Records real calls to a capture log
#[derive(Clone, Default)]
pub struct Recorder {
    writer: Option<Arc<CaptureWriter>>,
}

impl Recorder {
    /// Record to `path`; an empty path disables capture
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Ok(Self::disabled());
        }
        Ok(Self {
            writer: Some(Arc::new(CaptureWriter::create(path)?)),
        })
    }

    /// A recorder that captures nothing
    pub fn disabled() -> Self {
        Self { writer: None }
    }

    /// Build from configuration
    pub fn from_settings(settings: &CaptureSettings) -> Result<Self> {
        match &settings.output_path {
            Some(path) => Self::new(path),
            None => Ok(Self::disabled()),
        }
    }

    /// Whether calls are being captured
    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    /// The underlying writer, if capture is enabled
    pub fn writer(&self) -> Option<&CaptureWriter> {
        self.writer.as_deref()
    }

    /// Run a real unary call and capture its outcome.
    ///
    /// The call's result is returned unchanged; capture problems are only
    /// logged.
    pub async fn intercept<Req, Resp, E, F, Fut>(
        &self,
        full_method: &str,
        request: &Req,
        invoker: F,
    ) -> std::result::Result<Resp, E>
    where
        Req: Serialize + ?Sized,
        Resp: Serialize,
        E: Display,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Resp, E>>,
    {
        let result = invoker().await;
        if self.writer.is_none() {
            return result;
        }

        let request = Document::from_serialize(request);
        let outcome = match &result {
            Ok(resp) => Document::from_serialize(resp).map(|doc| (doc, None)),
            Err(e) => Ok((Document::Null, Some(e.to_string()))),
        };
        match (request, outcome) {
            (Ok(request), Ok((response, error))) => {
                self.record(full_method, request, response, error.as_deref());
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::error!(
                    method = full_method,
                    error = %e,
                    "could not convert call for capture"
                );
            }
        }
        result
    }

    /// Wrap a client connection so every unary call through it is captured
    pub fn wrap<C: ClientConn>(&self, conn: C) -> RecordingConn<C> {
        RecordingConn {
            inner: conn,
            recorder: self.clone(),
        }
    }

    /// Wait for queued records to be written
    pub async fn drain(&self) -> Result<()> {
        match &self.writer {
            Some(writer) => writer.drain().await,
            None => Ok(()),
        }
    }

    /// Stop capturing and return how many records were written
    pub async fn close(&self) -> Result<u64> {
        match &self.writer {
            Some(writer) => writer.close().await,
            None => Ok(0),
        }
    }

    fn record(
        &self,
        full_method: &str,
        request: Document,
        response: Document,
        error: Option<&str>,
    ) {
        if let Some(writer) = &self.writer {
            let target = ServiceMethod::parse(full_method);
            writer.capture(target.service(), target.method(), request, response, error);
        }
    }
}

/// A [`ClientConn`] that captures every unary call of the wrapped connection
pub struct RecordingConn<C> {
    inner: C,
    recorder: Recorder,
}

impl<C> RecordingConn<C> {
    /// The wrapped connection
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// The recorder in use
    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }
}

#[async_trait]
impl<C: ClientConn> ClientConn for RecordingConn<C> {
    async fn invoke(
        &self,
        ctx: &CallContext,
        full_method: &str,
        args: &Document,
    ) -> Result<Document> {
        let result = self.inner.invoke(ctx, full_method, args).await;
        if self.recorder.is_enabled() {
            match &result {
                Ok(response) => {
                    self.recorder
                        .record(full_method, args.clone(), response.clone(), None)
                }
                Err(e) => self.recorder.record(
                    full_method,
                    args.clone(),
                    Document::Null,
                    Some(&e.to_string()),
                ),
            }
        }
        result
    }

    fn new_stream(&self, ctx: &CallContext, full_method: &str) -> Result<DocumentStream> {
        self.inner.new_stream(ctx, full_method)
    }
}
