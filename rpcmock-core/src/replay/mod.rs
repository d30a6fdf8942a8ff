//! Replay side of the engine
//!
//! Loads a capture log into an immutable [`MatchIndex`] and answers calls by
//! returning the response (or configured error) of the first matching
//! record.
//!
//! # Example
//!
//! ```rust,no_run
//! use rpcmock_core::replay::Replayer;
//! use rpcmock_core::rpc::{CallContext, MockServer};
//! use std::time::Duration;
//!
//! # async fn run() -> rpcmock_core::error::Result<()> {
//! let replayer = Replayer::builder("testdata/capture.log")
//!     .min_delay(Duration::from_millis(10))
//!     .max_delay(Duration::from_millis(50))
//!     .build()?;
//!
//! let response = replayer
//!     .serve(&CallContext::new(), "ExampleService", "Echo", br#"{"msg":"hi"}"#)
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod delay;
mod engine;
mod index;
mod matcher;

pub use delay::DelayInjector;
pub use engine::{Replayer, ReplayerBuilder};
pub use index::{Candidate, MatchIndex};
pub use matcher::{find_match, match_document, match_request};

#[cfg(test)]
mod tests;
