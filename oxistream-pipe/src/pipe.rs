//! A thread-safe bounded byte pipe with backpressure and independent
//! half-close.
//!
//! [`BoundedPipe`] owns a fixed-capacity byte ring shared by exactly one
//! producer thread and one consumer thread. Each side obtains its endpoint
//! through a one-shot accessor ([`BoundedPipe::reader`] /
//! [`BoundedPipe::writer`]) and may close independently; the ring storage is
//! released once both sides have closed.
//!
//! All shared state lives under one mutex. Every blocking wait sits on a
//! single condition variable and re-checks its predicate under the lock, and
//! every state mutation notifies all waiters, so a state change during a
//! wait can never be missed — including when a backpressure wait and the
//! drain watermark are armed at the same time.
//!
//! # Example
//!
//! ```
//! use oxistream_pipe::BoundedPipe;
//! use std::thread;
//!
//! let mut pipe = BoundedPipe::new(4);
//! let mut writer = pipe.writer().unwrap();
//! let mut reader = pipe.reader().unwrap();
//!
//! let producer = thread::spawn(move || {
//!     let mut remaining: &[u8] = b"hello";
//!     while !remaining.is_empty() {
//!         let n = writer.write_bytes(remaining).unwrap();
//!         remaining = &remaining[n..];
//!     }
//!     // Dropping the writer closes its side; the reader sees end-of-data.
//! });
//!
//! let mut out = Vec::new();
//! let mut buf = [0u8; 3];
//! loop {
//!     let n = reader.read_bytes(&mut buf).unwrap();
//!     if n == 0 {
//!         break;
//!     }
//!     out.extend_from_slice(&buf[..n]);
//! }
//! producer.join().unwrap();
//! assert_eq!(out, b"hello");
//! ```

use oxistream_core::error::{Result, StreamError};
use std::io::{self, Read, Write};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// Fixed-capacity FIFO byte ring.
///
/// Valid bytes occupy `len` positions starting at `head`, wrapping at
/// `capacity`.
#[derive(Debug)]
struct ByteRing {
    buf: Box<[u8]>,
    head: usize,
    len: usize,
}

impl ByteRing {
    fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn is_full(&self) -> bool {
        self.len == self.buf.len()
    }

    /// Enqueue up to `data.len()` bytes; returns the count actually taken.
    fn push(&mut self, data: &[u8]) -> usize {
        let n = (self.buf.len() - self.len).min(data.len());
        let tail = (self.head + self.len) % self.buf.len();
        let first = n.min(self.buf.len() - tail);
        self.buf[tail..tail + first].copy_from_slice(&data[..first]);
        self.buf[..n - first].copy_from_slice(&data[first..n]);
        self.len += n;
        n
    }

    /// Dequeue up to `out.len()` bytes; returns the count actually moved.
    fn pop(&mut self, out: &mut [u8]) -> usize {
        let n = self.len.min(out.len());
        let first = n.min(self.buf.len() - self.head);
        out[..first].copy_from_slice(&self.buf[self.head..self.head + first]);
        out[first..n].copy_from_slice(&self.buf[..n - first]);
        self.head = (self.head + n) % self.buf.len();
        self.len -= n;
        n
    }

    /// Drop the storage. Called once both sides have closed; the ring is
    /// never touched again afterwards.
    fn release(&mut self) {
        self.buf = Box::new([]);
        self.head = 0;
        self.len = 0;
    }
}

/// Mutable pipe state, guarded by the shared mutex.
#[derive(Debug)]
struct PipeState {
    ring: ByteRing,
    reader_closed: bool,
    writer_closed: bool,
    cancelled: bool,
    /// Cumulative bytes dequeued by the reader.
    total_read: u64,
    /// Cumulative bytes enqueued by the writer.
    total_written: u64,
    /// Pending drain watermark, set while a `wait_for_drain` is blocked.
    drain_target: Option<u64>,
}

impl PipeState {
    fn release_if_done(&mut self) {
        if self.reader_closed && self.writer_closed {
            self.ring.release();
        }
    }
}

#[derive(Debug)]
struct PipeShared {
    state: Mutex<PipeState>,
    cond: Condvar,
    drain_control: bool,
}

impl PipeShared {
    /// Lock the state. A poisoned mutex means a peer panicked while holding
    /// the lock; the state itself is still a consistent byte ring, so the
    /// poison is stripped.
    fn lock(&self) -> MutexGuard<'_, PipeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, PipeState>) -> MutexGuard<'a, PipeState> {
        self.cond
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn close_side(&self, reader: bool) {
        let mut st = self.lock();
        let flag = if reader {
            &mut st.reader_closed
        } else {
            &mut st.writer_closed
        };
        if !*flag {
            *flag = true;
            st.release_if_done();
            self.cond.notify_all();
        }
    }
}

/// A bounded cross-thread byte pipe.
///
/// The coordinator constructs the pipe and hands out the two endpoints, one
/// per side, each obtainable at most once. See the [module docs](self) for
/// the full protocol.
#[derive(Debug)]
pub struct BoundedPipe {
    shared: Arc<PipeShared>,
    capacity: usize,
    reader_taken: bool,
    writer_taken: bool,
}

impl BoundedPipe {
    /// Create a pipe with the given ring capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        Self::build(capacity, false)
    }

    /// Create a pipe with synchronous-drain support: its writer may block
    /// until the reader has consumed a target cumulative byte count via
    /// [`PipeWriter::wait_for_drain`].
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_drain_control(capacity: usize) -> Self {
        Self::build(capacity, true)
    }

    fn build(capacity: usize, drain_control: bool) -> Self {
        assert!(capacity > 0, "Capacity must be greater than 0");
        Self {
            shared: Arc::new(PipeShared {
                state: Mutex::new(PipeState {
                    ring: ByteRing::new(capacity),
                    reader_closed: false,
                    writer_closed: false,
                    cancelled: false,
                    total_read: 0,
                    total_written: 0,
                    drain_target: None,
                }),
                cond: Condvar::new(),
                drain_control,
            }),
            capacity,
            reader_taken: false,
            writer_taken: false,
        }
    }

    /// Ring capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether this pipe was built with drain control.
    pub fn drain_control(&self) -> bool {
        self.shared.drain_control
    }

    /// Take the reader endpoint. A second request is a usage error.
    pub fn reader(&mut self) -> Result<PipeReader> {
        if self.reader_taken {
            return Err(StreamError::endpoint_taken("reader"));
        }
        self.reader_taken = true;
        Ok(PipeReader {
            shared: Arc::clone(&self.shared),
        })
    }

    /// Take the writer endpoint. A second request is a usage error.
    pub fn writer(&mut self) -> Result<PipeWriter> {
        if self.writer_taken {
            return Err(StreamError::endpoint_taken("writer"));
        }
        self.writer_taken = true;
        Ok(PipeWriter {
            shared: Arc::clone(&self.shared),
        })
    }

    /// Obtain a handle that can abort every blocking wait on this pipe.
    pub fn cancel_handle(&self) -> PipeCancelHandle {
        PipeCancelHandle {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Aborts blocking pipe operations.
///
/// Cancellation is sticky: once fired, every pipe operation fails with
/// [`StreamError::Cancelled`] — a distinct outcome, never a false
/// end-of-data or a false success.
#[derive(Debug, Clone)]
pub struct PipeCancelHandle {
    shared: Arc<PipeShared>,
}

impl PipeCancelHandle {
    /// Cancel the pipe, waking every blocked wait.
    pub fn cancel(&self) {
        let mut st = self.shared.lock();
        st.cancelled = true;
        self.shared.cond.notify_all();
    }
}

/// The consumer endpoint of a [`BoundedPipe`].
///
/// Dropping the reader closes its side.
#[derive(Debug)]
pub struct PipeReader {
    shared: Arc<PipeShared>,
}

impl PipeReader {
    /// Dequeue up to `out.len()` bytes, blocking while the pipe is empty
    /// and fully open.
    ///
    /// Returns 0 only when the writer has closed and the ring is drained.
    /// Everything immediately available is dequeued in one call without
    /// re-blocking.
    pub fn read_bytes(&mut self, out: &mut [u8]) -> Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        let mut st = self.shared.lock();
        loop {
            if st.cancelled {
                return Err(StreamError::Cancelled);
            }
            if st.reader_closed {
                return Err(StreamError::ClosedByReader);
            }
            if !st.ring.is_empty() {
                break;
            }
            if st.writer_closed {
                return Ok(0);
            }
            st = self.shared.wait(st);
        }
        let n = st.ring.pop(out);
        st.total_read += n as u64;
        // Wakes a blocked writer and any drain waiter.
        self.shared.cond.notify_all();
        Ok(n)
    }

    /// Cumulative bytes dequeued through this endpoint.
    pub fn consumed(&self) -> u64 {
        self.shared.lock().total_read
    }

    /// Close the reader side. Idempotent.
    pub fn close(&mut self) {
        self.shared.close_side(true);
    }
}

impl Read for PipeReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        self.read_bytes(out).map_err(io::Error::from)
    }
}

impl Drop for PipeReader {
    fn drop(&mut self) {
        self.close();
    }
}

/// The producer endpoint of a [`BoundedPipe`].
///
/// Dropping the writer closes its side; a drained reader then observes
/// end-of-data.
#[derive(Debug)]
pub struct PipeWriter {
    shared: Arc<PipeShared>,
}

impl PipeWriter {
    /// Enqueue up to `data.len()` bytes, blocking while the ring is full
    /// and fully open. The caller loops for any remainder.
    ///
    /// Closure of either side, observed before or during the wait, is an
    /// error: a blocked writer is never left hanging.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        let mut st = self.shared.lock();
        loop {
            if st.cancelled {
                return Err(StreamError::Cancelled);
            }
            if st.reader_closed || st.writer_closed {
                return Err(StreamError::Closed);
            }
            if !st.ring.is_full() {
                break;
            }
            st = self.shared.wait(st);
        }
        let n = st.ring.push(data);
        st.total_written += n as u64;
        self.shared.cond.notify_all();
        Ok(n)
    }

    /// Block until the reader has consumed at least `target` cumulative
    /// bytes, or either side closes (error), or the pipe is cancelled.
    ///
    /// Only available on pipes built with
    /// [`BoundedPipe::with_drain_control`]; otherwise a usage error. This
    /// lets a producer proceed in lockstep with consumption, bounding
    /// memory use for an unbounded producer.
    pub fn wait_for_drain(&mut self, target: u64) -> Result<()> {
        if !self.shared.drain_control {
            return Err(StreamError::DrainUnsupported);
        }
        let mut st = self.shared.lock();
        st.drain_target = Some(target);
        let result = loop {
            if st.cancelled {
                break Err(StreamError::Cancelled);
            }
            if st.total_read >= target {
                break Ok(());
            }
            if st.reader_closed || st.writer_closed {
                break Err(StreamError::Closed);
            }
            st = self.shared.wait(st);
        };
        st.drain_target = None;
        result
    }

    /// Cumulative bytes enqueued through this endpoint.
    pub fn written(&self) -> u64 {
        self.shared.lock().total_written
    }

    /// The watermark of a currently blocked
    /// [`wait_for_drain`](Self::wait_for_drain), if any. Diagnostic.
    pub fn pending_drain_target(&self) -> Option<u64> {
        self.shared.lock().drain_target
    }

    /// Close the writer side. Idempotent.
    pub fn close(&mut self) {
        self.shared.close_side(false);
    }
}

impl Write for PipeWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.write_bytes(data).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        // Enqueued bytes are immediately visible to the reader.
        Ok(())
    }
}

impl Drop for PipeWriter {
    fn drop(&mut self) {
        self.close();
    }
}
