//! # OxiStream Core
//!
//! Core stream layers for the OxiStream toolkit.
//!
//! This crate provides the single-threaded building blocks of a layered
//! byte/bit stream stack:
//!
//! - [`position`]: abstract stream-position arithmetic
//! - [`traits`]: random-access contract and progress sinks
//! - [`buffer`]: buffering wrappers that batch physical I/O
//! - [`window`]: sub-range views presented as independent streams
//! - [`bitstream`]: bit-granularity packing with a configurable bit order
//! - [`reverse`]: back-to-front iteration with a look-behind buffer
//! - [`error`]: error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Codec integration                                   │
//! │     worker bridge, bounded pipe (oxistream-pipe)        │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Composition (this crate)                            │
//! │     WindowStream, BlockReader/Writer, ReverseReader     │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Granularity (this crate)                            │
//! │     BitReader/BitWriter over any byte stream            │
//! ├─────────────────────────────────────────────────────────┤
//! │ L0: Transport                                           │
//! │     std::io::Read / Write, RandomAccess                 │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Byte transport is `std::io::Read`/`Write`; every wrapper is generic over
//! them and implements them in turn, so layers nest in any order. Positions
//! of random-access streams are opaque: the wrappers only ever advance a
//! position by a byte count or measure the distance between two positions.
//!
//! ## Example
//!
//! ```rust
//! use oxistream_core::buffer::BlockReader;
//! use oxistream_core::window::WindowStream;
//! use std::io::{Cursor, Read};
//!
//! // A buffered view of bytes [8, 16) of a larger stream.
//! let base = Cursor::new((0u8..32).collect::<Vec<_>>());
//! let window = WindowStream::new(base, 8, Some(8)).unwrap();
//! let mut reader = BlockReader::new(window);
//!
//! let mut out = Vec::new();
//! reader.read_to_end(&mut out).unwrap();
//! assert_eq!(out, (8u8..16).collect::<Vec<_>>());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod buffer;
pub mod error;
pub mod position;
pub mod reverse;
pub mod traits;
pub mod window;

// Re-exports for convenience
pub use bitstream::{BitOrder, BitReader, BitWriter};
pub use buffer::{BlockReader, BlockWriter, PositionedBlockReader, PositionedBlockWriter};
pub use error::{Result, StreamError};
pub use position::StreamPosition;
pub use reverse::ReverseReader;
pub use traits::{ProgressSink, RandomAccess};
pub use window::{WindowReader, WindowStream, WindowWriter};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{BitOrder, BitReader, BitWriter};
    pub use crate::buffer::{BlockReader, BlockWriter};
    pub use crate::error::{Result, StreamError};
    pub use crate::position::StreamPosition;
    pub use crate::reverse::ReverseReader;
    pub use crate::traits::{ProgressSink, RandomAccess};
    pub use crate::window::{WindowReader, WindowStream, WindowWriter};
}
