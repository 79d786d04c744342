//! Couples a caller-owned codec worker thread to a pipe endpoint.
//!
//! A foreign synchronous encoder/decoder loop cannot be rewritten
//! cooperatively; instead the caller spawns it on its own thread, hands it
//! one end of a [`BoundedPipe`](crate::BoundedPipe), and drives the other
//! end through the ordinary stream interface. The bridge types here make
//! sure the worker's outcome is never lost: the worker is joined exactly
//! once when its stream ends, and a failure or panic replaces what would
//! otherwise be a silent end-of-data.
//!
//! # Example
//!
//! ```
//! use oxistream_pipe::{BoundedPipe, WorkerReader};
//! use std::io::Read;
//! use std::thread;
//!
//! let mut pipe = BoundedPipe::new(16);
//! let mut producer_end = pipe.writer().unwrap();
//!
//! // The caller owns the worker thread; here it stands in for a codec
//! // loop decoding into the pipe.
//! let worker = thread::spawn(move || {
//!     let mut remaining: &[u8] = b"decoded";
//!     while !remaining.is_empty() {
//!         let n = producer_end.write_bytes(remaining)?;
//!         remaining = &remaining[n..];
//!     }
//!     Ok(())
//! });
//!
//! let mut reader = WorkerReader::new(pipe.reader().unwrap(), worker);
//! let mut out = Vec::new();
//! reader.read_to_end(&mut out).unwrap();
//! assert_eq!(out, b"decoded");
//! ```

use crate::pipe::{PipeReader, PipeWriter};
use oxistream_core::error::{Result, StreamError};
use std::io::{self, Read, Write};
use std::thread::JoinHandle;

fn join_worker(worker: &mut Option<JoinHandle<Result<()>>>) -> Result<()> {
    match worker.take() {
        Some(handle) => match handle.join() {
            Ok(outcome) => outcome,
            Err(_) => Err(StreamError::WorkerPanicked),
        },
        None => Ok(()),
    }
}

/// A [`PipeReader`] coupled to the worker thread feeding it.
///
/// End-of-data joins the worker, so a codec failure surfaces to the
/// consumer as an error instead of a clean-looking end of stream.
#[derive(Debug)]
pub struct WorkerReader {
    inner: PipeReader,
    worker: Option<JoinHandle<Result<()>>>,
}

impl WorkerReader {
    /// Couple `inner` to the worker that owns the opposite endpoint.
    pub fn new(inner: PipeReader, worker: JoinHandle<Result<()>>) -> Self {
        Self {
            inner,
            worker: Some(worker),
        }
    }

    /// Read like [`PipeReader::read_bytes`]; a 0 return has been validated
    /// against the worker's outcome.
    pub fn read_bytes(&mut self, out: &mut [u8]) -> Result<usize> {
        let n = self.inner.read_bytes(out)?;
        if n == 0 && !out.is_empty() {
            join_worker(&mut self.worker)?;
        }
        Ok(n)
    }

    /// Close the consumer side without waiting for the worker's remaining
    /// output. The worker observes the closure as an error and terminates;
    /// its outcome is discarded.
    pub fn abandon(mut self) {
        self.inner.close();
        let _ = join_worker(&mut self.worker);
    }
}

impl Read for WorkerReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        self.read_bytes(out).map_err(io::Error::from)
    }
}

/// A [`PipeWriter`] coupled to the worker thread draining it.
///
/// [`finish`](Self::finish) closes the producer side and joins the worker,
/// surfacing its outcome. Dropping an unfinished writer performs the same
/// sequence best-effort.
#[derive(Debug)]
pub struct WorkerWriter {
    inner: PipeWriter,
    worker: Option<JoinHandle<Result<()>>>,
}

impl WorkerWriter {
    /// Couple `inner` to the worker that owns the opposite endpoint.
    pub fn new(inner: PipeWriter, worker: JoinHandle<Result<()>>) -> Self {
        Self {
            inner,
            worker: Some(worker),
        }
    }

    /// Write like [`PipeWriter::write_bytes`].
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<usize> {
        self.inner.write_bytes(data)
    }

    /// Close the producer side, wait for the worker to drain and finish,
    /// and surface its outcome. Idempotent.
    pub fn finish(&mut self) -> Result<()> {
        self.inner.close();
        join_worker(&mut self.worker)
    }
}

impl Write for WorkerWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.write_bytes(data).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for WorkerWriter {
    fn drop(&mut self) {
        // Best-effort finish on drop.
        let _ = self.finish();
    }
}
