//! Core contracts for stream layers.
//!
//! Byte transport uses `std::io::Read` and `std::io::Write` directly; every
//! wrapper in this crate is generic over them and implements them in turn so
//! layers nest freely. This module adds the contracts std does not provide:
//! random access over an abstract position type, and the diagnostic progress
//! sink.
//!
//! # Ownership
//!
//! Wrappers take their base stream by value. Disposal then cascades through
//! `Drop`. To leave a base stream open, construct the wrapper over
//! `&mut base` instead; std's blanket `Read`/`Write` impls for `&mut R` and
//! this module's [`RandomAccess`] impl for `&mut T` make every wrapper
//! usable both ways. Owning wrappers also expose `into_inner` to reclaim
//! the base.

use crate::error::Result;
use crate::position::StreamPosition;
use std::fs::File;
use std::io::{self, Seek, SeekFrom};

/// Random access over an abstract position type.
///
/// Sequential streams only carry the `Read`/`Write` contracts; streams that
/// can seek additionally implement this trait. All position arithmetic in
/// the wrapper layers goes through [`StreamPosition`], never through a
/// concrete numeric type.
pub trait RandomAccess {
    /// The position type of this stream.
    type Pos: StreamPosition;

    /// Current position.
    fn position(&mut self) -> Result<Self::Pos>;

    /// Move to `pos`.
    fn seek_to(&mut self, pos: Self::Pos) -> Result<()>;

    /// Bytes from the current position to the end of the stream.
    fn remaining(&mut self) -> Result<u64>;
}

impl<T: RandomAccess + ?Sized> RandomAccess for &mut T {
    type Pos = T::Pos;

    fn position(&mut self) -> Result<Self::Pos> {
        (**self).position()
    }

    fn seek_to(&mut self, pos: Self::Pos) -> Result<()> {
        (**self).seek_to(pos)
    }

    fn remaining(&mut self) -> Result<u64> {
        (**self).remaining()
    }
}

impl<T: AsRef<[u8]>> RandomAccess for io::Cursor<T> {
    type Pos = u64;

    fn position(&mut self) -> Result<u64> {
        Ok(io::Cursor::position(self))
    }

    fn seek_to(&mut self, pos: u64) -> Result<()> {
        self.set_position(pos);
        Ok(())
    }

    fn remaining(&mut self) -> Result<u64> {
        let len = self.get_ref().as_ref().len() as u64;
        Ok(len.saturating_sub(io::Cursor::position(self)))
    }
}

impl RandomAccess for File {
    type Pos = u64;

    fn position(&mut self) -> Result<u64> {
        Ok(self.stream_position()?)
    }

    fn seek_to(&mut self, pos: u64) -> Result<()> {
        self.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    fn remaining(&mut self) -> Result<u64> {
        let cur = self.stream_position()?;
        let len = self.metadata()?.len();
        Ok(len.saturating_sub(cur))
    }
}

/// A diagnostic progress sink.
///
/// Progress reporting is best-effort: callers invoke sinks through
/// [`report_progress`], which catches and discards panics so a faulty sink
/// can never abort an otherwise-successful operation.
pub trait ProgressSink {
    /// Called with the cumulative number of bytes processed.
    fn report(&mut self, bytes: u64);
}

impl<F: FnMut(u64)> ProgressSink for F {
    fn report(&mut self, bytes: u64) {
        self(bytes)
    }
}

/// Invoke a progress sink, swallowing any panic it raises.
pub(crate) fn report_progress(sink: &mut dyn ProgressSink, bytes: u64) {
    let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| sink.report(bytes)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_random_access() {
        let mut cur = io::Cursor::new(vec![0u8; 100]);
        assert_eq!(RandomAccess::position(&mut cur).unwrap(), 0);
        assert_eq!(cur.remaining().unwrap(), 100);

        cur.seek_to(40).unwrap();
        assert_eq!(RandomAccess::position(&mut cur).unwrap(), 40);
        assert_eq!(cur.remaining().unwrap(), 60);
    }

    #[test]
    fn test_cursor_remaining_past_end() {
        let mut cur = io::Cursor::new([1u8, 2, 3]);
        cur.seek_to(10).unwrap();
        assert_eq!(cur.remaining().unwrap(), 0);
    }

    #[test]
    fn test_mut_ref_forwarding() {
        let mut cur = io::Cursor::new(vec![0u8; 10]);
        let mut borrowed = &mut cur;
        borrowed.seek_to(4).unwrap();
        assert_eq!(borrowed.remaining().unwrap(), 6);
        // Base is still usable afterwards: leave-open by borrow.
        assert_eq!(RandomAccess::position(&mut cur).unwrap(), 4);
    }

    #[test]
    fn test_progress_sink_panic_discarded() {
        let mut count = 0u32;
        {
            let mut sink = |_bytes: u64| {
                count += 1;
                panic!("sink failure");
            };
            report_progress(&mut sink, 10);
            report_progress(&mut sink, 20);
        }
        // Both calls ran and both panics were swallowed.
        assert_eq!(count, 2);
    }
}
