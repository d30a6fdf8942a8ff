//! Typed adapter for generated per-service mocks
//!
//! A generated mock for a service holds a [`ServiceMock`] and implements
//! each RPC method as a single `call`. The input is JSON-encoded and passed to
//! [`MockServer::serve`], and the output is decoded into the method's
//! response type.
//!
//! ```rust,no_run
//! use rpcmock_core::replay::Replayer;
//! use rpcmock_core::rpc::CallContext;
//! use rpcmock_core::stub::ServiceMock;
//! use std::sync::Arc;
//!
//! #[derive(serde::Serialize)]
//! struct EchoRequest { msg: String }
//!
//! #[derive(serde::Deserialize, Default)]
//! struct EchoResponse { msg: String }
//!
//! struct MockExampleService(ServiceMock);
//!
//! impl MockExampleService {
//!     async fn echo(&self, ctx: &CallContext, input: &EchoRequest)
//!         -> rpcmock_core::error::Result<EchoResponse> {
//!         self.0.call(ctx, "Echo", input).await
//!     }
//! }
//!
//! # fn build() -> rpcmock_core::error::Result<MockExampleService> {
//! let replayer = Replayer::from_path("capture.log")?;
//! Ok(MockExampleService(ServiceMock::new("ExampleService", Arc::new(replayer))))
//! # }
//! ```

use crate::error::Result;
use crate::rpc::{CallContext, MockServer};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

const NULL_BODY: &[u8] = b"null";

/// Delegates every method of one service to a [`MockServer`]
#[derive(Clone)]
pub struct ServiceMock {
    service: String,
    server: Arc<dyn MockServer>,
}

impl ServiceMock {
    /// Create a mock for `service` answered by `server`
    pub fn new(service: impl Into<String>, server: Arc<dyn MockServer>) -> Self {
        Self {
            service: service.into(),
            server,
        }
    }

    /// Service name used for every call
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Call `method` with a typed input and decode the typed output.
    ///
    /// A null response decodes to `Resp::default()`.
    pub async fn call<Req, Resp>(
        &self,
        ctx: &CallContext,
        method: &str,
        input: &Req,
    ) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned + Default,
    {
        let request = serde_json::to_vec(input)?;
        let response = self.server.serve(ctx, &self.service, method, &request).await?;
        if response.as_slice() == NULL_BODY {
            return Ok(Resp::default());
        }
        Ok(serde_json::from_slice(&response)?)
    }
}
