//! Back-to-front iteration over a random-access byte range.
//!
//! [`ReverseReader`] yields the bytes of `[start, start+len)` in reverse
//! order without materializing the range: a fixed look-behind buffer is
//! refilled by seeking backward one block at a time, reading each block
//! forward, and yielding its bytes back-to-front.

use crate::error::Result;
use crate::position::StreamPosition;
use crate::traits::{ProgressSink, RandomAccess, report_progress};
use std::io::Read;

/// Default look-behind buffer capacity (8 KiB).
pub const DEFAULT_LOOKBEHIND: usize = 8 * 1024;

/// Yields the bytes of a random-access range in reverse order.
///
/// Progress (bytes consumed, counted from the end of the range) is reported
/// to an optional sink each time a look-behind block is exhausted. Progress
/// is diagnostic-only: a sink that panics is caught and discarded.
pub struct ReverseReader<S: Read + RandomAccess> {
    inner: S,
    start: S::Pos,
    len: u64,
    /// Current block, in forward order, covering
    /// `[buf_start, buf_start + buf.len())` relative to `start`.
    buf: Vec<u8>,
    buf_start: u64,
    /// Bytes not yet yielded; the next byte has relative index
    /// `remaining - 1`.
    remaining: u64,
    capacity: usize,
    progress: Option<Box<dyn ProgressSink>>,
}

impl<S: Read + RandomAccess> ReverseReader<S> {
    /// Create a reverse reader over `[start, start+len)` with the default
    /// look-behind capacity.
    pub fn new(inner: S, start: S::Pos, len: u64) -> Self {
        Self::with_capacity(inner, start, len, DEFAULT_LOOKBEHIND)
    }

    /// Create a reverse reader with the given look-behind capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(inner: S, start: S::Pos, len: u64, capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than 0");
        Self {
            inner,
            start,
            len,
            buf: Vec::new(),
            buf_start: 0,
            remaining: len,
            capacity,
            progress: None,
        }
    }

    /// Attach a progress sink.
    pub fn with_progress(mut self, sink: Box<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Total range length.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the range is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes not yet yielded.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Consume the wrapper and return the base stream.
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Load the block ending just past the next byte to yield.
    fn load_block(&mut self) -> Result<()> {
        let block_end = self.remaining;
        let block_start = block_end.saturating_sub(self.capacity as u64);
        let block_len = (block_end - block_start) as usize;

        self.inner.seek_to(self.start.add(block_start))?;
        self.buf.resize(block_len, 0);
        self.inner.read_exact(&mut self.buf)?;
        self.buf_start = block_start;
        Ok(())
    }

    /// Yield the next byte, back to front. Returns `Ok(None)` once the
    /// start of the range has been reached.
    pub fn next_byte(&mut self) -> Result<Option<u8>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        let idx = self.remaining - 1;
        let in_buf = idx >= self.buf_start && idx < self.buf_start + self.buf.len() as u64;
        if !in_buf {
            self.load_block()?;
        }
        let byte = self.buf[(idx - self.buf_start) as usize];
        self.remaining -= 1;

        if self.remaining == self.buf_start {
            // Block exhausted: report cumulative consumption from the end.
            let consumed = self.len - self.remaining;
            if let Some(sink) = self.progress.as_mut() {
                report_progress(sink.as_mut(), consumed);
            }
        }
        Ok(Some(byte))
    }
}

impl<S: Read + RandomAccess> Iterator for ReverseReader<S> {
    type Item = Result<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_byte().transpose()
    }
}
