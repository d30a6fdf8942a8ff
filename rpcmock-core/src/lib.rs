//! # rpcmock - Record and Replay for RPC Traffic
//!
//! rpcmock captures real unary RPC calls (request, response, error) to a
//! durable log, then replays matching responses to callers without touching
//! the real backend. It is meant for automated tests of RPC clients and
//! services.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rpcmock_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Replay a previously captured log
//!     let replayer = Replayer::from_path("testdata/capture.log")?;
//!
//!     let mut reply = serde_json::Value::Null;
//!     invoke(
//!         &replayer,
//!         &CallContext::new(),
//!         "/example.ExampleService/Echo",
//!         &serde_json::json!({"msg": "hi"}),
//!         &mut reply,
//!     )
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Documents**: schema-less payload trees with structural equality
//! - **Records**: one captured call each, stored in a separator-delimited log
//! - **Capture**: a background single-writer task appends records durably
//! - **Replay**: an immutable match index, first-match-wins matching with
//!   per-record ignore paths, and optional synthetic latency
//! - **Stubs**: a typed adapter generated per-service mocks delegate to

pub mod capture;
pub mod config;
pub mod document;
pub mod error;
pub mod record;
pub mod replay;
pub mod rpc;
pub mod stub;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::capture::{CaptureWriter, Recorder, RecordingConn};
    pub use crate::config::{CaptureSettings, ConfigBuilder, MockConfig, ReplayConfig};
    pub use crate::document::{Document, IgnorePath, IgnoreSet};
    pub use crate::error::{MockError, Result};
    pub use crate::record::{Record, SEPARATOR};
    pub use crate::replay::{DelayInjector, MatchIndex, Replayer, ReplayerBuilder};
    pub use crate::rpc::{CallContext, ClientConn, MockServer, ServiceMethod, invoke};
    pub use crate::stub::ServiceMock;
}
