//! The `error` module defines the error types used within the `publine` application.
//!
//! Errors are split by the layer that produces them so callers can decide
//! locally whether a failure is recoverable (a bad line), tears a session down
//! (transport), or ends the process (bind failure, client command failure).

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Failure while reading or writing framed messages on a stream.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A single inbound line that could not be turned into a message.
///
/// Decode errors never close the connection; the offending line is dropped.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("line is not valid UTF-8")]
    InvalidUtf8,

    #[error("line exceeds {max} bytes")]
    TooLong { max: usize },

    #[error("malformed message: {reason}")]
    Malformed { line: String, reason: String },

    /// Well-formed object with an unknown kind or missing required fields.
    #[error("unrecognized message: {line}")]
    Unrecognized { line: String },
}

impl DecodeError {
    /// Whether the line should be dropped silently instead of reported.
    pub fn is_silent(&self) -> bool {
        matches!(self, DecodeError::Unrecognized { .. })
    }
}

/// Returned by `Session::send` once the session's outbound queue is gone.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session {0} is closed")]
    Closed(String),
}

/// Fatal server startup failures.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
}

/// Failures of the command-line client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not connect to {0}")]
    ConnectionRefused(String),

    #[error("timed out after {0:?} waiting for {1}")]
    AckTimeout(Duration, &'static str),

    #[error("server disconnected")]
    Disconnected,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<io::Error> for ClientError {
    fn from(err: io::Error) -> Self {
        ClientError::Transport(TransportError::Io(err))
    }
}
