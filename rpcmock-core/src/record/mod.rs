//! Captured call records and the log encoding
//!
//! A capture log is a sequence of pretty-printed JSON documents, one per
//! [`Record`], each followed by [`SEPARATOR`]. The separator starts and ends
//! with a newline, which pretty JSON never emits inside a string, so it
//! cannot appear inside a valid record.
//!
//! ```text
//! {
//!   "request": { "msg": "hi" },
//!   "response": { "msg": "hi" },
//!   "service": "ExampleService",
//!   "method": "Echo",
//!   "error": "",
//!   "ignore": []
//! }
//! ------##------
//! ```

mod log;

pub use log::{LogChunk, LogScanner, decode_chunk, encode_record, read_log};

use crate::document::{Document, IgnoreSet};
use crate::rpc::ServiceMethod;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delimiter written after every record in a capture log
pub const SEPARATOR: &str = "\n------##------\n";

/// One captured RPC interaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Captured request; null makes the record match any request
    #[serde(default)]
    pub request: Document,

    /// Captured response; may be null
    #[serde(default)]
    pub response: Document,

    /// Service name
    pub service: String,

    /// Method name
    pub method: String,

    /// Error text; empty when the call succeeded
    #[serde(default)]
    pub error: String,

    /// Request paths excluded from matching
    #[serde(default)]
    pub ignore: Vec<String>,

    /// When the call was captured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
}

impl Record {
    /// Create a successful record
    pub fn new(
        service: impl Into<String>,
        method: impl Into<String>,
        request: Document,
        response: Document,
    ) -> Self {
        Self {
            request,
            response,
            service: service.into(),
            method: method.into(),
            error: String::new(),
            ignore: Vec::new(),
            captured_at: None,
        }
    }

    /// Create a record for `service`/`method` from a full method path
    pub fn for_method(target: &ServiceMethod, request: Document, response: Document) -> Self {
        Self::new(target.service(), target.method(), request, response)
    }

    /// Replay `error` instead of the response
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = error.into();
        self
    }

    /// Add a request path to ignore when matching
    pub fn with_ignore(mut self, path: impl Into<String>) -> Self {
        self.ignore.push(path.into());
        self
    }

    /// Stamp the capture time
    pub fn with_captured_at(mut self, at: DateTime<Utc>) -> Self {
        self.captured_at = Some(at);
        self
    }

    /// Whether the record replays a failure
    pub fn is_failure(&self) -> bool {
        !self.error.is_empty()
    }

    /// Whether the record matches any request
    pub fn is_wildcard(&self) -> bool {
        self.request.is_null()
    }

    /// Lookup key in the match index
    pub fn key(&self) -> String {
        crate::rpc::lookup_key(&self.service, &self.method)
    }

    /// Parsed ignore paths
    pub fn ignore_set(&self) -> IgnoreSet {
        IgnoreSet::new(&self.ignore)
    }
}
