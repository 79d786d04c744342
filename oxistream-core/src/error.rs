//! Error types for stream layer operations.
//!
//! This module provides a single error type covering the stream layers:
//! transport failures from the base resource, size/data errors from the
//! windowing wrappers, and the usage, closure, and cancellation errors of
//! the bounded pipe.

use std::io;
use thiserror::Error;

/// The main error type for oxistream operations.
#[derive(Debug, Error)]
pub enum StreamError {
    /// I/O error from the underlying reader/writer. Transport errors
    /// propagate unchanged.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A windowed stream ended before the declared size was reached, or a
    /// write ran past the declared size. Distinct from plain I/O failure so
    /// callers can map it to a "corrupt input" outcome.
    #[error("stream size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Declared size of the window.
        expected: u64,
        /// Bytes actually transferred when the mismatch was detected.
        actual: u64,
    },

    /// A one-shot pipe endpoint was requested twice.
    #[error("pipe {end} endpoint already taken")]
    EndpointTaken {
        /// Which endpoint was requested (`"reader"` or `"writer"`).
        end: &'static str,
    },

    /// `wait_for_drain` was called on a pipe built without drain control.
    #[error("pipe was not constructed with drain control")]
    DrainUnsupported,

    /// An argument was out of range for the operation.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of the bad argument.
        message: String,
    },

    /// The pipe was closed while the peer was blocked or transferring.
    #[error("stream closed")]
    Closed,

    /// The reader end of the pipe closed the stream.
    #[error("stream closed by reader")]
    ClosedByReader,

    /// A blocking wait was aborted by a cancellation signal. Never collapsed
    /// into success or end-of-data.
    #[error("operation cancelled")]
    Cancelled,

    /// A codec worker thread panicked before completing its stream.
    #[error("worker thread panicked")]
    WorkerPanicked,
}

/// Result type alias for oxistream operations.
pub type Result<T> = std::result::Result<T, StreamError>;

impl StreamError {
    /// Create a size mismatch error.
    pub fn size_mismatch(expected: u64, actual: u64) -> Self {
        Self::SizeMismatch { expected, actual }
    }

    /// Create an endpoint-taken usage error.
    pub fn endpoint_taken(end: &'static str) -> Self {
        Self::EndpointTaken { end }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Whether this error is the cancellation outcome.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Whether this error reports pipe closure by either side.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed | Self::ClosedByReader)
    }
}

impl From<StreamError> for io::Error {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Io(e) => e,
            StreamError::SizeMismatch { .. } => io::Error::new(io::ErrorKind::InvalidData, err),
            StreamError::Closed | StreamError::ClosedByReader => {
                io::Error::new(io::ErrorKind::BrokenPipe, err)
            }
            StreamError::Cancelled => io::Error::new(io::ErrorKind::Interrupted, err),
            StreamError::InvalidInput { .. } => io::Error::new(io::ErrorKind::InvalidInput, err),
            StreamError::EndpointTaken { .. }
            | StreamError::DrainUnsupported
            | StreamError::WorkerPanicked => io::Error::other(err),
        }
    }
}
