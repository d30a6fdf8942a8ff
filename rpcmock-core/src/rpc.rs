//! RPC surface shared by the capture and replay sides
//!
//! Defines how a transport-level method identifier maps to a
//! service/method pair, the per-call context, and the two traits the engine
//! plugs into:
//!
//! - [`MockServer`]: the byte-oriented `serve` capability generated
//!   per-service mock stubs delegate to.
//! - [`ClientConn`]: a unary-call interception contract. A replaying engine
//!   implements it directly; a recording wrapper implements it around a real
//!   connection.

use crate::document::Document;
use crate::error::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;

/// Service and method used when a method path cannot be parsed
pub const UNPARSABLE: &str = "error";

/// Build the match index key for a service/method pair
pub fn lookup_key(service: &str, method: &str) -> String {
    format!("{}/{}", service, method)
}

/// A service/method pair recovered from a full method path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceMethod {
    service: String,
    method: String,
}

impl ServiceMethod {
    /// Create from explicit names
    pub fn new(service: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            method: method.into(),
        }
    }

    /// Parse a full method path such as `/package.Service/Method`.
    ///
    /// The last `.`-separated segment must split on `/` into exactly two
    /// non-empty parts. Anything else degrades to `("error", "error")`.
    pub fn parse(full_method: &str) -> Self {
        let last = full_method.rsplit('.').next().unwrap_or(full_method);
        let parts: Vec<&str> = last.split('/').collect();
        match parts.as_slice() {
            [service, method] if !service.is_empty() && !method.is_empty() => {
                Self::new(*service, *method)
            }
            _ => Self::new(UNPARSABLE, UNPARSABLE),
        }
    }

    /// Service name
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Method name
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Match index key
    pub fn key(&self) -> String {
        lookup_key(&self.service, &self.method)
    }

    /// Whether parsing failed and the pair is the `error/error` placeholder
    pub fn is_unparsable(&self) -> bool {
        self.service == UNPARSABLE && self.method == UNPARSABLE
    }
}

impl fmt::Display for ServiceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.service, self.method)
    }
}

/// Per-call context passed through the engine
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    /// Trace ID for correlating log lines
    pub trace_id: Option<String>,

    /// Transport metadata of the call
    pub metadata: HashMap<String, String>,
}

impl CallContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the trace ID
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Byte-oriented capability exposed to generated mock stubs
#[async_trait]
pub trait MockServer: Send + Sync {
    /// Answer one unary call of `service`/`method` with JSON `request` bytes
    async fn serve(
        &self,
        ctx: &CallContext,
        service: &str,
        method: &str,
        request: &[u8],
    ) -> Result<Vec<u8>>;
}

/// Stream of response documents for a streaming call
pub type DocumentStream = BoxStream<'static, Result<Document>>;

/// Generic unary-call contract of a client connection
#[async_trait]
pub trait ClientConn: Send + Sync {
    /// Perform a unary call
    async fn invoke(&self, ctx: &CallContext, full_method: &str, args: &Document)
    -> Result<Document>;

    /// Begin a streaming call
    fn new_stream(&self, ctx: &CallContext, full_method: &str) -> Result<DocumentStream>;
}

/// Typed unary call over any [`ClientConn`].
///
/// `reply` is overwritten with the decoded response, or left untouched when
/// the response is the null document.
pub async fn invoke<C, Req, Resp>(
    conn: &C,
    ctx: &CallContext,
    full_method: &str,
    args: &Req,
    reply: &mut Resp,
) -> Result<()>
where
    C: ClientConn + ?Sized,
    Req: Serialize + ?Sized,
    Resp: DeserializeOwned,
{
    let request = Document::from_serialize(args)?;
    let response = conn.invoke(ctx, full_method, &request).await?;
    if response.is_null() {
        return Ok(());
    }
    *reply = response.deserialize_into()?;
    Ok(())
}
