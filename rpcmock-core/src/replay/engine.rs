//! Replay engine
//!
//! [`Replayer`] answers calls from a loaded [`MatchIndex`], optionally
//! adding synthetic latency. It implements both [`MockServer`] (for generated
//! stubs) and [`ClientConn`] (as a drop-in client connection).

use super::delay::DelayInjector;
use super::index::MatchIndex;
use super::matcher;
use crate::config::ReplayConfig;
use crate::document::Document;
use crate::error::{MockError, Result};
use crate::rpc::{CallContext, ClientConn, DocumentStream, MockServer, ServiceMethod, lookup_key};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Replays captured responses without touching a real backend
#[derive(Debug, Clone)]
pub struct Replayer {
    index: Arc<MatchIndex>,
    delay: DelayInjector,
}

impl Replayer {
    /// Create a replayer over an already built index
    pub fn new(index: MatchIndex) -> Self {
        Self {
            index: Arc::new(index),
            delay: DelayInjector::disabled(),
        }
    }

    /// Load a capture log with no delay
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(MatchIndex::load(path)?))
    }

    /// Start building a replayer for a capture log
    pub fn builder(path: impl Into<PathBuf>) -> ReplayerBuilder {
        ReplayerBuilder::new(path)
    }

    /// Build from configuration
    pub fn from_config(config: &ReplayConfig) -> Result<Self> {
        let path = config.log_path.as_ref().ok_or_else(|| {
            MockError::Configuration("replay.log_path is not set".to_string())
        })?;
        Self::builder(path)
            .min_delay(config.min_delay)
            .max_delay(config.max_delay)
            .build()
    }

    /// Replace the delay bounds
    pub fn with_delay(mut self, min: Duration, max: Duration) -> Self {
        self.delay = DelayInjector::new(min, max);
        self
    }

    /// The match index
    pub fn index(&self) -> &MatchIndex {
        &self.index
    }

    /// The configured delay
    pub fn delay(&self) -> DelayInjector {
        self.delay
    }

    /// Match a request document without delay
    pub fn match_document(&self, target: &ServiceMethod, request: &Document) -> Result<Document> {
        matcher::match_document(&self.index, &target.key(), request)
    }
}

#[async_trait]
impl MockServer for Replayer {
    async fn serve(
        &self,
        ctx: &CallContext,
        service: &str,
        method: &str,
        request: &[u8],
    ) -> Result<Vec<u8>> {
        let key = lookup_key(service, method);
        tracing::debug!(key = %key, trace_id = ?ctx.trace_id, "serving replayed call");

        let result = matcher::match_request(&self.index, &key, request);
        self.delay.wait().await;
        result
    }
}

#[async_trait]
impl ClientConn for Replayer {
    async fn invoke(
        &self,
        ctx: &CallContext,
        full_method: &str,
        args: &Document,
    ) -> Result<Document> {
        let target = ServiceMethod::parse(full_method);
        let request = args.to_vec()?;
        let response = self
            .serve(ctx, target.service(), target.method(), &request)
            .await?;
        Ok(Document::from_slice(&response)?)
    }

    fn new_stream(&self, _ctx: &CallContext, full_method: &str) -> Result<DocumentStream> {
        Err(MockError::Unsupported(format!(
            "streaming replay is not supported ({})",
            full_method
        )))
    }
}

/// Builder for [`Replayer`]
#[derive(Debug, Clone)]
pub struct ReplayerBuilder {
    path: PathBuf,
    min_delay: Duration,
    max_delay: Duration,
}

impl ReplayerBuilder {
    /// Create a builder for the capture log at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Set the minimum synthetic delay
    pub fn min_delay(mut self, min: Duration) -> Self {
        self.min_delay = min;
        self
    }

    /// Set the maximum synthetic delay
    pub fn max_delay(mut self, max: Duration) -> Self {
        self.max_delay = max;
        self
    }

    /// Load the log and build the replayer
    pub fn build(self) -> Result<Replayer> {
        Ok(Replayer::from_path(&self.path)?.with_delay(self.min_delay, self.max_delay))
    }
}
