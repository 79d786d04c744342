//! Buffering wrappers that batch small logical transfers into few physical
//! ones.
//!
//! [`BlockReader`] and [`BlockWriter`] keep a fixed-capacity window in front
//! of the base stream. Logical reads and writes move bytes between caller
//! buffers and the window; physical I/O happens one window at a time. A
//! transfer at least as large as the window bypasses it entirely.
//!
//! [`PositionedBlockReader`] and [`PositionedBlockWriter`] add a
//! caller-visible logical position for random-access bases: the physical
//! cursor runs ahead of (input) or behind (output) the logical one by the
//! buffered amount, and the logical position is recovered through the
//! [`StreamPosition`] capability alone.
//!
//! # Example
//!
//! ```
//! use oxistream_core::buffer::BlockWriter;
//! use std::io::Write;
//!
//! let mut out = Vec::new();
//! {
//!     let mut writer = BlockWriter::with_capacity(&mut out, 8);
//!     writer.write_all(b"hello, world").unwrap();
//!     writer.flush().unwrap();
//! }
//! assert_eq!(out, b"hello, world");
//! ```

use crate::error::Result;
use crate::position::StreamPosition;
use crate::traits::RandomAccess;
use std::io::{self, Read, Write};

/// Default window capacity for the buffering wrappers (64 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// A buffering reader that batches physical reads.
///
/// On exhaustion of the internal window one physical read of up to the
/// window capacity is issued. A physical read returning 0 permanently marks
/// end-of-stream; the base stream is never touched again afterwards.
#[derive(Debug)]
pub struct BlockReader<R> {
    /// Base stream.
    inner: R,
    /// The window. Valid bytes are `buf[head..tail]`.
    buf: Box<[u8]>,
    head: usize,
    tail: usize,
    /// Latched once a physical read returns 0.
    eof: bool,
}

impl<R: Read> BlockReader<R> {
    /// Create a reader with the default window capacity.
    pub fn new(inner: R) -> Self {
        Self::with_capacity(inner, DEFAULT_BUFFER_SIZE)
    }

    /// Create a reader with the given window capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(inner: R, capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than 0");
        Self {
            inner,
            buf: vec![0; capacity].into_boxed_slice(),
            head: 0,
            tail: 0,
            eof: false,
        }
    }

    /// Get a reference to the base stream.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Get a mutable reference to the base stream.
    ///
    /// Reading from the base directly desynchronizes the window.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the wrapper and return the base stream.
    ///
    /// Buffered-but-unconsumed bytes are discarded.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Window capacity.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes buffered but not yet consumed.
    pub fn available(&self) -> usize {
        self.tail - self.head
    }

    /// Issue one physical read into the window. Returns the byte count and
    /// latches `eof` on 0.
    fn fill(&mut self) -> io::Result<usize> {
        debug_assert_eq!(self.head, self.tail);
        self.head = 0;
        self.tail = 0;
        let n = self.inner.read(&mut self.buf)?;
        if n == 0 {
            self.eof = true;
        }
        self.tail = n;
        Ok(n)
    }
}

impl<R: Read> Read for BlockReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        if self.head == self.tail {
            if self.eof {
                return Ok(0);
            }
            // Large request with an empty window: skip the copy.
            if out.len() >= self.buf.len() {
                let n = self.inner.read(out)?;
                if n == 0 {
                    self.eof = true;
                }
                return Ok(n);
            }
            if self.fill()? == 0 {
                return Ok(0);
            }
        }
        let n = (self.tail - self.head).min(out.len());
        out[..n].copy_from_slice(&self.buf[self.head..self.head + n]);
        self.head += n;
        Ok(n)
    }
}

/// A buffering writer that batches physical writes.
///
/// Logical writes copy into the window; whenever it fills, the entire window
/// is written to the base stream in one physical write. `flush` issues a
/// partial physical write of whatever is pending.
#[derive(Debug)]
pub struct BlockWriter<W: Write> {
    /// Base stream.
    inner: W,
    /// The window. Pending bytes are `buf[..len]`.
    buf: Box<[u8]>,
    len: usize,
}

impl<W: Write> BlockWriter<W> {
    /// Create a writer with the default window capacity.
    pub fn new(inner: W) -> Self {
        Self::with_capacity(inner, DEFAULT_BUFFER_SIZE)
    }

    /// Create a writer with the given window capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(inner: W, capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than 0");
        Self {
            inner,
            buf: vec![0; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    /// Get a reference to the base stream.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Get a mutable reference to the base stream.
    ///
    /// Writing to the base directly reorders bytes around the pending
    /// window.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Consume the wrapper and return the base stream.
    ///
    /// Pending bytes are flushed to the base first.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush_window()?;
        let this = std::mem::ManuallyDrop::new(self);
        // SAFETY: self is consumed and Drop is suppressed; each owned field
        // is moved out exactly once.
        let inner = unsafe { std::ptr::read(&this.inner) };
        let _buf = unsafe { std::ptr::read(&this.buf) };
        Ok(inner)
    }

    /// Window capacity.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes buffered but not yet flushed.
    pub fn pending(&self) -> usize {
        self.len
    }

    /// Write the pending window to the base stream.
    fn flush_window(&mut self) -> io::Result<()> {
        if self.len > 0 {
            let len = self.len;
            self.inner.write_all(&self.buf[..len])?;
            self.len = 0;
        }
        Ok(())
    }
}

impl<W: Write> Write for BlockWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        if self.len == self.buf.len() {
            self.flush_window()?;
        }
        // Large transfer with an empty window: skip the copy.
        if self.len == 0 && data.len() >= self.buf.len() {
            return self.inner.write(data);
        }
        let n = (self.buf.len() - self.len).min(data.len());
        self.buf[self.len..self.len + n].copy_from_slice(&data[..n]);
        self.len += n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_window()?;
        self.inner.flush()
    }
}

impl<W: Write> Drop for BlockWriter<W> {
    fn drop(&mut self) {
        // Best-effort flush on drop.
        let _ = self.flush_window();
    }
}

/// A [`BlockReader`] over a random-access base, exposing the logical
/// position.
///
/// The base's physical cursor runs ahead of the logical one by the
/// buffered-but-unconsumed amount; `position` reports the logical cursor by
/// advancing the position recorded at the last refill.
#[derive(Debug)]
pub struct PositionedBlockReader<R: Read + RandomAccess> {
    inner: BlockReader<R>,
    /// Base position at which the current window was filled. `None` while
    /// the window is empty.
    window_base: Option<R::Pos>,
}

impl<R: Read + RandomAccess> PositionedBlockReader<R> {
    /// Create a reader with the default window capacity.
    pub fn new(inner: R) -> Self {
        Self::with_capacity(inner, DEFAULT_BUFFER_SIZE)
    }

    /// Create a reader with the given window capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(inner: R, capacity: usize) -> Self {
        Self {
            inner: BlockReader::with_capacity(inner, capacity),
            window_base: None,
        }
    }

    /// Get a reference to the base stream.
    pub fn get_ref(&self) -> &R {
        self.inner.get_ref()
    }

    /// Consume the wrapper and return the base stream.
    ///
    /// The base is left at its physical position; buffered bytes are
    /// discarded. Call [`Self::seek_to`] with the logical position first to
    /// hand off seamlessly.
    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }

    /// Logical position: the position of the next byte a `read` would
    /// return.
    pub fn logical_position(&mut self) -> Result<R::Pos> {
        match self.window_base {
            Some(base) if self.inner.head < self.inner.tail => {
                Ok(base.add(self.inner.head as u64))
            }
            _ => self.inner.inner.position(),
        }
    }

    /// Discard the window and move the base to `pos`.
    ///
    /// Seeking clears the end-of-stream latch.
    pub fn seek_logical(&mut self, pos: R::Pos) -> Result<()> {
        self.inner.head = 0;
        self.inner.tail = 0;
        self.inner.eof = false;
        self.window_base = None;
        self.inner.inner.seek_to(pos)
    }
}

impl<R: Read + RandomAccess> Read for PositionedBlockReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        if self.inner.head == self.inner.tail {
            if self.inner.eof {
                return Ok(0);
            }
            if out.len() >= self.inner.buf.len() {
                self.window_base = None;
                let n = self.inner.inner.read(out)?;
                if n == 0 {
                    self.inner.eof = true;
                }
                return Ok(n);
            }
            let base = self.inner.inner.position().map_err(io::Error::from)?;
            if self.inner.fill()? == 0 {
                return Ok(0);
            }
            self.window_base = Some(base);
        }
        let n = (self.inner.tail - self.inner.head).min(out.len());
        out[..n].copy_from_slice(&self.inner.buf[self.inner.head..self.inner.head + n]);
        self.inner.head += n;
        Ok(n)
    }
}

impl<R: Read + RandomAccess> RandomAccess for PositionedBlockReader<R> {
    type Pos = R::Pos;

    fn position(&mut self) -> Result<R::Pos> {
        self.logical_position()
    }

    fn seek_to(&mut self, pos: R::Pos) -> Result<()> {
        self.seek_logical(pos)
    }

    fn remaining(&mut self) -> Result<u64> {
        Ok(self.inner.inner.remaining()? + self.inner.available() as u64)
    }
}

/// A [`BlockWriter`] over a random-access base, exposing the logical
/// position.
///
/// The base's physical cursor lags the logical one by the pending amount;
/// `position` reports the physical position advanced by the pending bytes.
#[derive(Debug)]
pub struct PositionedBlockWriter<W: Write + RandomAccess> {
    inner: BlockWriter<W>,
}

impl<W: Write + RandomAccess> PositionedBlockWriter<W> {
    /// Create a writer with the default window capacity.
    pub fn new(inner: W) -> Self {
        Self::with_capacity(inner, DEFAULT_BUFFER_SIZE)
    }

    /// Create a writer with the given window capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(inner: W, capacity: usize) -> Self {
        Self {
            inner: BlockWriter::with_capacity(inner, capacity),
        }
    }

    /// Get a reference to the base stream.
    pub fn get_ref(&self) -> &W {
        self.inner.get_ref()
    }

    /// Consume the wrapper and return the base stream, flushing pending
    /// bytes first.
    pub fn into_inner(self) -> Result<W> {
        self.inner.into_inner()
    }

    /// Logical position: the position the next written byte will land at.
    pub fn logical_position(&mut self) -> Result<W::Pos> {
        let pending = self.inner.len as u64;
        Ok(self.inner.inner.position()?.add(pending))
    }

    /// Flush the window and move the base to `pos`.
    pub fn seek_logical(&mut self, pos: W::Pos) -> Result<()> {
        self.inner.flush_window()?;
        self.inner.inner.seek_to(pos)
    }
}

impl<W: Write + RandomAccess> Write for PositionedBlockWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.inner.write(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write + RandomAccess> RandomAccess for PositionedBlockWriter<W> {
    type Pos = W::Pos;

    fn position(&mut self) -> Result<W::Pos> {
        self.logical_position()
    }

    fn seek_to(&mut self, pos: W::Pos) -> Result<()> {
        self.seek_logical(pos)
    }

    fn remaining(&mut self) -> Result<u64> {
        let pending = self.inner.len as u64;
        Ok(self.inner.inner.remaining()?.saturating_sub(pending))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// A reader that serves data in fixed short chunks and counts physical
    /// reads.
    struct ChunkedReader {
        data: Vec<u8>,
        pos: usize,
        chunk: usize,
        reads: usize,
    }

    impl Read for ChunkedReader {
        fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            let n = self.chunk.min(out.len()).min(self.data.len() - self.pos);
            out[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    /// A writer that records the size of every physical write.
    #[derive(Default)]
    struct RecordingWriter {
        data: Vec<u8>,
        writes: Vec<usize>,
    }

    impl Write for RecordingWriter {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            self.writes.push(data.len());
            self.data.extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_reader_batches_physical_reads() {
        let data: Vec<u8> = (0..=255).collect();
        let mut reader = BlockReader::with_capacity(Cursor::new(data.clone()), 64);

        let mut out = Vec::new();
        let mut byte = [0u8; 1];
        while reader.read(&mut byte).unwrap() == 1 {
            out.push(byte[0]);
        }
        assert_eq!(out, data);
    }

    #[test]
    fn test_reader_eof_latch() {
        let mut base = ChunkedReader {
            data: vec![1, 2, 3],
            pos: 0,
            chunk: 16,
            reads: 0,
        };
        {
            let mut reader = BlockReader::with_capacity(&mut base, 8);
            let mut out = [0u8; 8];
            assert_eq!(reader.read(&mut out).unwrap(), 3);
            assert_eq!(reader.read(&mut out).unwrap(), 0);
            // End is latched: no further base reads.
            assert_eq!(reader.read(&mut out).unwrap(), 0);
            assert_eq!(reader.read(&mut out).unwrap(), 0);
        }
        assert_eq!(base.reads, 2); // one data read, one empty read
    }

    #[test]
    fn test_reader_large_request_bypasses_window() {
        let data = vec![7u8; 100];
        let mut reader = BlockReader::with_capacity(Cursor::new(data), 8);
        let mut out = [0u8; 100];
        let n = reader.read(&mut out).unwrap();
        assert_eq!(n, 100);
        assert!(out.iter().all(|&b| b == 7));
    }

    #[test]
    fn test_writer_flushes_whole_windows() {
        let mut base = RecordingWriter::default();
        {
            let mut writer = BlockWriter::with_capacity(&mut base, 4);
            for b in 0u8..10 {
                writer.write_all(&[b]).unwrap();
            }
            writer.flush().unwrap();
        }
        assert_eq!(base.data, (0u8..10).collect::<Vec<_>>());
        // Two full windows and one partial flush.
        assert_eq!(base.writes, vec![4, 4, 2]);
    }

    #[test]
    fn test_writer_transparency_independent_of_chunking() {
        let payload: Vec<u8> = (0..1000u32).map(|i| i as u8).collect();
        for chunk in [1usize, 3, 16, 64, 1000] {
            let mut base = RecordingWriter::default();
            {
                let mut writer = BlockWriter::with_capacity(&mut base, 16);
                for piece in payload.chunks(chunk) {
                    writer.write_all(piece).unwrap();
                }
                writer.flush().unwrap();
            }
            assert_eq!(base.data, payload, "chunk size {chunk}");
        }
    }

    #[test]
    fn test_writer_flush_on_drop() {
        let mut base = RecordingWriter::default();
        {
            let mut writer = BlockWriter::with_capacity(&mut base, 64);
            writer.write_all(b"pending").unwrap();
        }
        assert_eq!(base.data, b"pending");
    }

    #[test]
    fn test_writer_into_inner_flushes() {
        let writer = {
            let mut w = BlockWriter::with_capacity(Vec::new(), 64);
            w.write_all(b"abc").unwrap();
            w
        };
        let base = writer.into_inner().unwrap();
        assert_eq!(base, b"abc");
    }

    #[test]
    fn test_positioned_reader_logical_position() {
        let data: Vec<u8> = (0..=99).collect();
        let mut reader = PositionedBlockReader::with_capacity(Cursor::new(data), 16);

        assert_eq!(reader.logical_position().unwrap(), 0);
        let mut out = [0u8; 5];
        reader.read(&mut out).unwrap();
        // Physical position is 16 (one window), logical is 5.
        assert_eq!(reader.logical_position().unwrap(), 5);
        reader.read(&mut out).unwrap();
        assert_eq!(reader.logical_position().unwrap(), 10);
        assert_eq!(reader.remaining().unwrap(), 90);
    }

    #[test]
    fn test_positioned_reader_seek_discards_window() {
        let data: Vec<u8> = (0..=99).collect();
        let mut reader = PositionedBlockReader::with_capacity(Cursor::new(data), 16);
        let mut out = [0u8; 4];
        reader.read(&mut out).unwrap();

        reader.seek_logical(50).unwrap();
        reader.read(&mut out).unwrap();
        assert_eq!(out, [50, 51, 52, 53]);
        assert_eq!(reader.logical_position().unwrap(), 54);
    }

    #[test]
    fn test_positioned_writer_logical_position() {
        let mut writer = PositionedBlockWriter::with_capacity(Cursor::new(Vec::new()), 16);
        assert_eq!(writer.logical_position().unwrap(), 0);
        writer.write_all(&[1, 2, 3]).unwrap();
        // Nothing flushed yet: physical 0, logical 3.
        assert_eq!(writer.logical_position().unwrap(), 3);
        writer.write_all(&[0u8; 20]).unwrap();
        assert_eq!(writer.logical_position().unwrap(), 23);

        let base = writer.into_inner().unwrap();
        assert_eq!(base.get_ref().len(), 23);
    }
}
