//! Windowing wrappers that present a sub-range of a base stream as an
//! independent, zero-based, size-limited stream.
//!
//! Two families:
//!
//! - [`WindowReader`] / [`WindowWriter`] for sequential bases: enforce a
//!   byte-count ceiling only, tracking cumulative bytes transferred.
//! - [`WindowStream`] for random-access bases: exposes `[start, start+size)`
//!   with window-relative seeking, translating positions through the
//!   [`StreamPosition`] capability.
//!
//! # Example
//!
//! ```
//! use oxistream_core::window::WindowStream;
//! use std::io::{Cursor, Read};
//!
//! let base = Cursor::new((0u8..100).collect::<Vec<_>>());
//! let mut window = WindowStream::new(base, 40, Some(10)).unwrap();
//!
//! let mut out = Vec::new();
//! window.read_to_end(&mut out).unwrap();
//! assert_eq!(out, (40u8..50).collect::<Vec<_>>());
//! ```

use crate::error::{Result, StreamError};
use crate::position::StreamPosition;
use crate::traits::RandomAccess;
use std::io::{self, Read, Write};

/// A sequential reader limited to a declared byte count.
///
/// Reads past the declared size return 0 without error. A base stream that
/// ends before the declared size was served is a size-mismatch error: the
/// window promised bytes the base cannot deliver.
#[derive(Debug)]
pub struct WindowReader<R> {
    inner: R,
    size: u64,
    consumed: u64,
}

impl<R: Read> WindowReader<R> {
    /// Create a reader serving exactly `size` bytes of `inner`.
    pub fn new(inner: R, size: u64) -> Self {
        Self {
            inner,
            size,
            consumed: 0,
        }
    }

    /// Declared window size.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Cumulative bytes read through the window.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Bytes still available in the window.
    pub fn window_remaining(&self) -> u64 {
        self.size - self.consumed
    }

    /// Get a reference to the base stream.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Get a mutable reference to the base stream.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the wrapper and return the base stream.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for WindowReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let budget = self.size - self.consumed;
        if budget == 0 || out.is_empty() {
            return Ok(0);
        }
        let cap = (out.len() as u64).min(budget) as usize;
        let n = self.inner.read(&mut out[..cap])?;
        if n == 0 {
            // The base ended before the declared size was served.
            return Err(StreamError::size_mismatch(self.size, self.consumed).into());
        }
        self.consumed += n as u64;
        Ok(n)
    }
}

/// A sequential writer limited to a declared byte count.
///
/// A write that straddles the ceiling is clamped; a write attempted at a
/// full window is a size-mismatch error.
#[derive(Debug)]
pub struct WindowWriter<W> {
    inner: W,
    size: u64,
    written: u64,
}

impl<W: Write> WindowWriter<W> {
    /// Create a writer accepting exactly `size` bytes into `inner`.
    pub fn new(inner: W, size: u64) -> Self {
        Self {
            inner,
            size,
            written: 0,
        }
    }

    /// Declared window size.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Cumulative bytes written through the window.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Get a reference to the base stream.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Get a mutable reference to the base stream.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Consume the wrapper and return the base stream.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for WindowWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        let budget = self.size - self.written;
        if budget == 0 {
            return Err(StreamError::size_mismatch(self.size, self.written + data.len() as u64)
                .into());
        }
        let cap = (data.len() as u64).min(budget) as usize;
        let n = self.inner.write(&data[..cap])?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// `[start, start+size)` of a random-access base, presented as an
/// independent zero-based stream.
///
/// The window-relative cursor is always derived from the base position via
/// `distance_from`, so the base may be repositioned through the window at
/// will. With `size: None` the window extends to the end of the base.
#[derive(Debug)]
pub struct WindowStream<S: RandomAccess> {
    inner: S,
    start: S::Pos,
    size: Option<u64>,
}

impl<S: RandomAccess> WindowStream<S> {
    /// Create a window over `[start, start+size)`, seeking the base to
    /// `start`. `size: None` means "to the end of the base".
    pub fn new(mut inner: S, start: S::Pos, size: Option<u64>) -> Result<Self> {
        inner.seek_to(start)?;
        Ok(Self { inner, start, size })
    }

    /// Window-relative position of the next transfer.
    pub fn window_position(&mut self) -> Result<u64> {
        Ok(self.inner.position()?.distance_from(self.start))
    }

    /// Seek to a window-relative position.
    ///
    /// Seeking past a declared size is an invalid-input error.
    pub fn seek(&mut self, rel: u64) -> Result<()> {
        if let Some(size) = self.size {
            if rel > size {
                return Err(StreamError::invalid_input(format!(
                    "seek to {rel} is past window size {size}"
                )));
            }
        }
        self.inner.seek_to(self.start.add(rel))
    }

    /// Window length: the declared size clamped to what the base can still
    /// deliver, or the base remainder when no size was declared.
    pub fn len(&mut self) -> Result<u64> {
        let offset = self.window_position()?;
        let base_extent = offset + self.inner.remaining()?;
        Ok(match self.size {
            Some(size) => size.min(base_extent),
            None => base_extent,
        })
    }

    /// Whether the window is empty.
    pub fn is_empty(&mut self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Get a reference to the base stream.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Consume the wrapper and return the base stream.
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Remaining window budget for the next transfer: bytes until the
    /// declared ceiling, unlimited when no size was declared.
    fn budget(&mut self) -> Result<u64> {
        let offset = self.window_position()?;
        Ok(match self.size {
            Some(size) => size.saturating_sub(offset),
            None => u64::MAX,
        })
    }
}

impl<S: RandomAccess + Read> Read for WindowStream<S> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let budget = self.budget().map_err(io::Error::from)?;
        if budget == 0 || out.is_empty() {
            return Ok(0);
        }
        let cap = (out.len() as u64).min(budget) as usize;
        self.inner.read(&mut out[..cap])
    }
}

impl<S: RandomAccess + Write> Write for WindowStream<S> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        let budget = self.budget().map_err(io::Error::from)?;
        if budget == 0 {
            let offset = self.window_position().map_err(io::Error::from)?;
            let size = self.size.unwrap_or(0);
            return Err(StreamError::size_mismatch(size, offset + data.len() as u64).into());
        }
        let cap = (data.len() as u64).min(budget) as usize;
        self.inner.write(&data[..cap])
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<S: RandomAccess> RandomAccess for WindowStream<S> {
    type Pos = u64;

    fn position(&mut self) -> Result<u64> {
        self.window_position()
    }

    fn seek_to(&mut self, pos: u64) -> Result<()> {
        self.seek(pos)
    }

    fn remaining(&mut self) -> Result<u64> {
        let offset = self.window_position()?;
        Ok(self.len()?.saturating_sub(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn base100() -> Cursor<Vec<u8>> {
        Cursor::new((0u8..100).collect())
    }

    #[test]
    fn test_window_reader_serves_exact_range() {
        let mut base = base100();
        base.set_position(10);
        let mut reader = WindowReader::new(base, 20);

        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, (10u8..30).collect::<Vec<_>>());
        assert_eq!(reader.consumed(), 20);
    }

    #[test]
    fn test_window_reader_past_end_returns_zero() {
        let mut reader = WindowReader::new(base100(), 5);
        let mut out = [0u8; 10];
        assert_eq!(reader.read(&mut out).unwrap(), 5);
        assert_eq!(reader.read(&mut out).unwrap(), 0);
        assert_eq!(reader.read(&mut out).unwrap(), 0);
    }

    #[test]
    fn test_window_reader_premature_eof_is_size_mismatch() {
        // Base has 4 bytes, window declares 10.
        let base = Cursor::new(vec![1u8, 2, 3, 4]);
        let mut reader = WindowReader::new(base, 10);
        let mut out = [0u8; 10];
        assert_eq!(reader.read(&mut out).unwrap(), 4);
        let err = reader.read(&mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_window_writer_ceiling() {
        let mut writer = WindowWriter::new(Vec::new(), 4);
        assert_eq!(writer.write(b"abc").unwrap(), 3);
        // Straddling write is clamped.
        assert_eq!(writer.write(b"de").unwrap(), 1);
        // Window is full: next write errors.
        let err = writer.write(b"f").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert_eq!(writer.into_inner(), b"abcd");
    }

    #[test]
    fn test_window_stream_reads_window_bytes() {
        let mut window = WindowStream::new(base100(), 40, Some(10)).unwrap();
        let mut out = Vec::new();
        window.read_to_end(&mut out).unwrap();
        assert_eq!(out, (40u8..50).collect::<Vec<_>>());
        assert_eq!(window.window_position().unwrap(), 10);
    }

    #[test]
    fn test_window_stream_len_is_declared_size() {
        let mut window = WindowStream::new(base100(), 40, Some(10)).unwrap();
        assert_eq!(window.len().unwrap(), 10);
        // Length does not change as the cursor advances.
        let mut out = [0u8; 4];
        window.read(&mut out).unwrap();
        assert_eq!(window.len().unwrap(), 10);
    }

    #[test]
    fn test_window_stream_len_clamped_by_base() {
        // Window declares 50 but the base only has 20 bytes past start.
        let mut window = WindowStream::new(base100(), 80, Some(50)).unwrap();
        assert_eq!(window.len().unwrap(), 20);
    }

    #[test]
    fn test_window_stream_unsized_runs_to_base_end() {
        let mut window = WindowStream::new(base100(), 90, None).unwrap();
        assert_eq!(window.len().unwrap(), 10);
        let mut out = Vec::new();
        window.read_to_end(&mut out).unwrap();
        assert_eq!(out, (90u8..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_window_stream_seek_translates() {
        let mut window = WindowStream::new(base100(), 30, Some(40)).unwrap();
        window.seek(5).unwrap();
        let mut out = [0u8; 2];
        window.read(&mut out).unwrap();
        assert_eq!(out, [35, 36]);
        assert_eq!(window.window_position().unwrap(), 7);

        assert!(window.seek(41).is_err());
    }

    #[test]
    fn test_window_stream_write_budget() {
        let base = Cursor::new(vec![0u8; 100]);
        let mut window = WindowStream::new(base, 10, Some(4)).unwrap();
        window.write_all(b"abcd").unwrap();
        let err = window.write(b"e").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        let base = window.into_inner().into_inner();
        assert_eq!(&base[10..14], b"abcd");
        assert_eq!(base[14], 0);
    }

    #[test]
    fn test_window_stream_nests() {
        // A window of a window: outer [20, 70), inner [10, 20) of the outer,
        // so absolute [30, 40).
        let outer = WindowStream::new(base100(), 20, Some(50)).unwrap();
        let mut inner = WindowStream::new(outer, 10, Some(10)).unwrap();
        let mut out = Vec::new();
        inner.read_to_end(&mut out).unwrap();
        assert_eq!(out, (30u8..40).collect::<Vec<_>>());
    }
}
