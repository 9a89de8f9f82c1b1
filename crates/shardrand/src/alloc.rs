use crate::{Error, Result};

/// Reserves storage for the registry and for bulk transfer scratch buffers.
///
/// Allocation is injected so callers can bound memory use and so tests can
/// observe or fail allocations. Implementations must return an empty vector
/// whose capacity is at least `len`, or [`Error::AllocationFailure`].
pub trait ScratchAllocator {
    /// Returns an empty vector with room for `len` elements.
    ///
    /// # Errors
    /// - [`Error::AllocationFailure`] if the storage cannot be reserved.
    fn try_alloc<T>(&self, len: usize) -> Result<Vec<T>>;
}

impl<A: ScratchAllocator + ?Sized> ScratchAllocator for &A {
    fn try_alloc<T>(&self, len: usize) -> Result<Vec<T>> {
        (**self).try_alloc(len)
    }
}

/// Allocates from the global allocator without aborting on exhaustion.
#[derive(Default, Clone, Copy, Debug)]
pub struct SystemAllocator;

impl ScratchAllocator for SystemAllocator {
    fn try_alloc<T>(&self, len: usize) -> Result<Vec<T>> {
        let mut storage = Vec::new();
        storage
            .try_reserve_exact(len)
            .map_err(|_| Error::AllocationFailure { requested: len })?;
        Ok(storage)
    }
}

/// An allocator that refuses any request above `limit` elements.
///
/// Handy for capping the scratch memory a single read may pin.
#[derive(Clone, Copy, Debug)]
pub struct BoundedAllocator {
    limit: usize,
}

impl BoundedAllocator {
    /// Creates an allocator that accepts requests of at most `limit` elements.
    pub const fn new(limit: usize) -> Self {
        Self { limit }
    }
}

impl ScratchAllocator for BoundedAllocator {
    fn try_alloc<T>(&self, len: usize) -> Result<Vec<T>> {
        if len > self.limit {
            return Err(Error::AllocationFailure { requested: len });
        }
        SystemAllocator.try_alloc(len)
    }
}
