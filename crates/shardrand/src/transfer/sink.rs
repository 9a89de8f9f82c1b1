use crate::{Error, Result};
use std::io::{self, Write};

/// A permanent failure reported by a [`ClientSink`] copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyFault {
    /// What went wrong on the client side.
    pub kind: io::ErrorKind,
}

impl CopyFault {
    /// Creates a fault of the given kind.
    pub const fn new(kind: io::ErrorKind) -> Self {
        Self { kind }
    }
}

impl From<io::Error> for CopyFault {
    fn from(err: io::Error) -> Self {
        Self::new(err.kind())
    }
}

/// The client side of a bulk transfer: a destination across a trust or copy
/// boundary.
///
/// A copy may move fewer bytes than offered without that being an error; the
/// transfer loop retries the remaining range. Returning `Ok(0)` signals no
/// progress and counts against the caller's [`RetryPolicy`].
///
/// [`RetryPolicy`]: crate::RetryPolicy
pub trait ClientSink {
    /// Verifies the destination can accept `len` bytes.
    ///
    /// Called before any generation work.
    ///
    /// # Errors
    /// - [`Error::AccessFault`] if the destination is not writable for `len`
    ///   bytes.
    fn check_access(&self, len: usize) -> Result<()>;

    /// Copies a prefix of `src` to the destination at byte `offset`.
    ///
    /// Returns the number of bytes copied, at most `src.len()`.
    ///
    /// # Errors
    /// Returns a [`CopyFault`] when no further progress is possible.
    fn copy_from(&mut self, offset: usize, src: &[u8]) -> Result<usize, CopyFault>;
}

impl<C: ClientSink + ?Sized> ClientSink for &mut C {
    fn check_access(&self, len: usize) -> Result<()> {
        (**self).check_access(len)
    }

    fn copy_from(&mut self, offset: usize, src: &[u8]) -> Result<usize, CopyFault> {
        (**self).copy_from(offset, src)
    }
}

/// A client destination backed by a mutable byte slice.
#[derive(Debug)]
pub struct SliceSink<'a> {
    buf: &'a mut [u8],
}

impl<'a> SliceSink<'a> {
    /// Wraps `buf` as a transfer destination.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf }
    }
}

impl ClientSink for SliceSink<'_> {
    fn check_access(&self, len: usize) -> Result<()> {
        if len > self.buf.len() {
            return Err(Error::AccessFault {
                requested: len,
                available: self.buf.len(),
            });
        }
        Ok(())
    }

    fn copy_from(&mut self, offset: usize, src: &[u8]) -> Result<usize, CopyFault> {
        let dest = offset
            .checked_add(src.len())
            .and_then(|end| self.buf.get_mut(offset..end))
            .ok_or(CopyFault::new(io::ErrorKind::InvalidInput))?;
        dest.copy_from_slice(src);
        Ok(src.len())
    }
}

/// A client destination backed by an [`io::Write`] stream.
///
/// Short writes are partial transfers. `Interrupted` writes are retried on the
/// spot and never count as stalls; `WouldBlock` counts as zero progress; every
/// other I/O error is a [`CopyFault`]. Offsets are implicit: bytes are
/// appended in order.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    /// Wraps `writer` as a transfer destination.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Flushes the underlying writer.
    ///
    /// # Errors
    /// Propagates the writer's flush error.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ClientSink for WriterSink<W> {
    fn check_access(&self, _len: usize) -> Result<()> {
        Ok(())
    }

    fn copy_from(&mut self, _offset: usize, src: &[u8]) -> Result<usize, CopyFault> {
        loop {
            match self.writer.write(src) {
                Ok(written) => return Ok(written),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => return Ok(0),
                Err(err) => return Err(err.into()),
            }
        }
    }
}
