//! Capture side of the engine
//!
//! Records real unary calls (request, response, error) to a capture log
//! without adding latency to, or ever failing, the call being observed.
//!
//! # Example
//!
//! ```rust,no_run
//! use rpcmock_core::capture::Recorder;
//!
//! # async fn run() -> rpcmock_core::error::Result<()> {
//! let recorder = Recorder::new("capture.log")?;
//!
//! let request = serde_json::json!({"msg": "hi"});
//! let reply: Result<serde_json::Value, String> = recorder
//!     .intercept("/example.ExampleService/Echo", &request, || async {
//!         // the real call goes here
//!         Ok(serde_json::json!({"msg": "hi"}))
//!     })
//!     .await;
//!
//! // Write everything still queued before shutting down
//! recorder.close().await?;
//! # Ok(())
//! # }
//! ```

mod recorder;
mod writer;

pub use recorder::{Recorder, RecordingConn};
pub use writer::CaptureWriter;

#[cfg(test)]
mod tests;
