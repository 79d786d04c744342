//! # OxiStream Pipe
//!
//! Bounded cross-thread byte pipe and codec worker bridge for the OxiStream
//! toolkit.
//!
//! This crate provides the one concurrency-safe structure of the stack:
//!
//! - [`pipe`]: a fixed-capacity byte ring connecting exactly one producer
//!   and one consumer thread, with backpressure, independent half-close,
//!   an optional synchronous-drain mode, and cancellation
//! - [`bridge`]: couples a caller-owned synchronous codec worker thread to
//!   a pipe endpoint so the worker's outcome surfaces at end-of-stream
//!
//! Everything else in OxiStream is single-threaded per instance; the pipe
//! is the sole synchronization point between the foreground stream consumer
//! and a background codec loop. No thread is ever spawned by this crate —
//! the worker is supplied and owned by the caller.
//!
//! ## Endpoint protocol
//!
//! ```text
//!            Open
//!           /    \
//!  ReaderClosed  WriterClosed
//!           \    /
//!         BothClosed   (ring storage released)
//! ```
//!
//! Each endpoint is handed out at most once, closes independently, and
//! closes automatically on drop. A blocked peer observes the closure as an
//! explicit error (writer side) or end-of-data (reader side after
//! draining), never as a hang or a silent empty result.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bridge;
pub mod pipe;

// Re-exports for convenience
pub use bridge::{WorkerReader, WorkerWriter};
pub use pipe::{BoundedPipe, PipeCancelHandle, PipeReader, PipeWriter};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bridge::{WorkerReader, WorkerWriter};
    pub use crate::pipe::{BoundedPipe, PipeCancelHandle, PipeReader, PipeWriter};
    pub use oxistream_core::error::{Result, StreamError};
}
