//! Forecourt Link Error Types
//!
//! Core error types shared by the forecourt protocol crates.

use thiserror::Error;

/// Result type for forecourt-link operations
pub type Result<T> = std::result::Result<T, LinkError>;

/// Forecourt link errors
#[derive(Debug, Error, Clone)]
pub enum LinkError {
    /// Structural frame parse failure
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// Frame checksum residue is nonzero
    #[error("checksum residue is nonzero")]
    ChecksumMismatch,

    /// No bytes within the read window
    #[error("timeout: {0}")]
    Timeout(String),

    /// Consecutive attempt failures on the shared channel
    #[error("no valid reply after {attempts} attempts")]
    ExhaustedRetries { attempts: u32 },

    /// Facade-level report of an unresponsive pump
    #[error("pump did not respond")]
    NoResponse,

    /// The pump answered, but the reply carried no transaction records
    #[error("pump answered without telemetry records")]
    NoTelemetry,

    /// Caller contract violation, rejected before any bus access
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A packed-BCD nibble above 9
    #[error("invalid BCD nibble 0x{0:X}")]
    InvalidDigit(u8),

    /// A value that does not fit the requested BCD width
    #[error("value {value} does not fit in {width} packed-BCD bytes")]
    InvalidMagnitude { value: i64, width: usize },

    /// A pump status code outside the documented set
    #[error("unknown pump status code {0}")]
    UnknownStatus(u8),

    /// IO errors
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for LinkError {
    fn from(err: std::io::Error) -> Self {
        LinkError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LinkError {
    fn from(err: serde_json::Error) -> Self {
        LinkError::Config(format!("JSON error: {}", err))
    }
}

// Helper methods for creating errors
impl LinkError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        LinkError::MalformedFrame(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        LinkError::Timeout(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        LinkError::InvalidInput(msg.into())
    }

    pub fn io(msg: impl Into<String>) -> Self {
        LinkError::Io(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        LinkError::Config(msg.into())
    }

    /// Check if this error is a retry trigger inside the channel transactor.
    ///
    /// Retry triggers never surface to facade callers; only terminal
    /// `ExhaustedRetries` does.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LinkError::MalformedFrame(_) | LinkError::ChecksumMismatch | LinkError::Timeout(_)
        )
    }
}
