//! Error types for rpcmock operations

use std::path::PathBuf;

/// Result type for rpcmock operations
pub type Result<T> = std::result::Result<T, MockError>;

/// Error types for the capture/replay engine
#[derive(Debug, thiserror::Error)]
pub enum MockError {
    /// Capture or replay file could not be opened or created
    #[error("could not open {}: {source}", path.display())]
    File {
        /// Path that was being opened
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },

    /// A log chunk failed to decode into a record
    #[error("malformed record in chunk {chunk} (byte offset {offset}): {reason}")]
    Parse {
        /// 0-based index of the chunk within the log
        chunk: usize,
        /// Byte offset of the chunk within the log
        offset: usize,
        /// Decoder message
        reason: String,
    },

    /// No captured record matched the inbound call
    #[error("could not find request for: {key}")]
    NoMatch {
        /// Lookup key (`service/method`)
        key: String,
    },

    /// The matched record replays a failure; the text is returned verbatim
    #[error("{0}")]
    Configured(String),

    /// Operation the engine does not support (streaming calls)
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl MockError {
    /// Whether this is a replay miss
    pub fn is_no_match(&self) -> bool {
        matches!(self, MockError::NoMatch { .. })
    }

    /// Whether this is a failure replayed from the log
    pub fn is_configured(&self) -> bool {
        matches!(self, MockError::Configured(_))
    }

    /// The replayed error text, if this is a configured failure
    pub fn configured_message(&self) -> Option<&str> {
        match self {
            MockError::Configured(msg) => Some(msg),
            _ => None,
        }
    }
}
