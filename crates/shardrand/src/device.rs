use crate::{
    ClientSink, PseudoStream, Result, RetryPolicy, ScratchAllocator, SliceSink, StreamState,
    SystemAllocator, UnitRegistry, transfer,
};
use std::io;

/// Name under which the endpoint is exposed.
pub const DEVICE_NAME: &str = "urandom-fast";

/// A read-style endpoint streaming pseudorandom bytes from a
/// [`UnitRegistry`].
///
/// Reads have no positional semantics: the offset is ignored and every read
/// continues the calling unit's stream. The output is fast and statistically
/// random but **not** cryptographically secure; do not read keys, nonces or
/// tokens from it.
///
/// `&PseudoRandomDevice` implements [`io::Read`], so the device composes with
/// [`io::copy`] and [`io::Read::take`].
///
/// # Example
/// ```
/// use shardrand::{
///     MonotonicClock, PseudoRandomDevice, StreamState, ThreadRandom, UnitRegistry,
/// };
/// use std::io::Read;
///
/// let mut registry = UnitRegistry::<StreamState>::init(2).unwrap();
/// registry.seed(&ThreadRandom, &MonotonicClock::new());
///
/// let device = PseudoRandomDevice::new(&registry);
/// let mut buf = [0u8; 32];
/// (&device).read_exact(&mut buf).unwrap();
/// ```
pub struct PseudoRandomDevice<'r, S: PseudoStream = StreamState, A = SystemAllocator> {
    registry: &'r UnitRegistry<S>,
    alloc: A,
    retry: RetryPolicy,
}

impl<'r, S: PseudoStream> PseudoRandomDevice<'r, S> {
    /// Creates an endpoint over `registry` with the default allocator and
    /// retry policy.
    pub fn new(registry: &'r UnitRegistry<S>) -> Self {
        Self::with_parts(registry, SystemAllocator, RetryPolicy::default())
    }
}

impl<'r, S, A> PseudoRandomDevice<'r, S, A>
where
    S: PseudoStream,
    A: ScratchAllocator,
{
    /// Creates an endpoint with an explicit scratch allocator and retry
    /// policy.
    pub fn with_parts(registry: &'r UnitRegistry<S>, alloc: A, retry: RetryPolicy) -> Self {
        Self {
            registry,
            alloc,
            retry,
        }
    }

    /// The registry this endpoint reads from.
    pub fn registry(&self) -> &'r UnitRegistry<S> {
        self.registry
    }

    /// The retry policy applied to client copies.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Delivers `len` pseudorandom bytes to `dest`.
    ///
    /// `offset` is accepted for read-interface compatibility and ignored.
    ///
    /// # Errors
    /// See [`transfer`].
    pub fn read<C>(&self, dest: &mut C, len: usize, _offset: u64) -> Result<usize>
    where
        C: ClientSink + ?Sized,
    {
        transfer(self.registry, dest, len, &self.alloc, &self.retry)
    }

    /// Like [`Self::read`], but reports failures as a negative `errno`.
    ///
    /// Returns the number of bytes delivered, or `-EFAULT`, `-ENOMEM`, etc.
    pub fn read_raw<C>(&self, dest: &mut C, len: usize, offset: u64) -> isize
    where
        C: ClientSink + ?Sized,
    {
        match self.read(dest, len, offset) {
            Ok(delivered) => isize::try_from(delivered).unwrap_or(isize::MAX),
            Err(err) => -(err.errno() as isize),
        }
    }
}

impl<S, A> io::Read for &PseudoRandomDevice<'_, S, A>
where
    S: PseudoStream,
    A: ScratchAllocator,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len();
        PseudoRandomDevice::read(*self, &mut SliceSink::new(buf), len, 0).map_err(io::Error::from)
    }
}
