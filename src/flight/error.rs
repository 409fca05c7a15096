//! Flight transport error types.

use std::io;
use thiserror::Error;

/// Result type for flight operations.
pub type FlightResult<T> = Result<T, FlightError>;

/// Errors that can occur while talking to the flight server.
#[derive(Error, Debug)]
pub enum FlightError {
    /// Failed to reach the flight server.
    #[error("failed to connect to flight server: {0}")]
    Connect(#[source] io::Error),

    /// Failed to write a request to the socket.
    #[error("failed to write to flight server: {0}")]
    Write(#[source] io::Error),

    /// Failed to read a response from the socket.
    #[error("failed to read from flight server: {0}")]
    Read(#[source] io::Error),

    /// Failed to serialize a request to JSON.
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    /// Failed to deserialize a response from JSON.
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    /// Response body was not valid base64.
    #[error("invalid response body: {0}")]
    Body(#[source] base64::DecodeError),

    /// Request timed out waiting for a response.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// The server closed the connection.
    #[error("flight server closed the connection")]
    ConnectionClosed,

    /// Response channel was closed (internal error).
    #[error("response channel closed unexpectedly")]
    ChannelClosed,

    /// Server returned an error response.
    #[error("flight server error: {message} (code: {code})")]
    Remote {
        /// Error code from the server.
        code: String,
        /// Error message from the server.
        message: String,
    },
}

impl FlightError {
    /// Create a remote error from an error response.
    pub fn remote(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Check if this error is retriable.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::ConnectionClosed | Self::ChannelClosed
        )
    }
}

impl From<io::Error> for FlightError {
    fn from(err: io::Error) -> Self {
        Self::Write(err)
    }
}

impl From<serde_json::Error> for FlightError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err)
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for FlightError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        Self::ChannelClosed
    }
}
