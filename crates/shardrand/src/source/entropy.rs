/// A trait for entropy sources used to seed the registry.
///
/// This abstraction allows you to plug in the system RNG or a mocked source in
/// tests. A source is assumed not to fail, but it may legitimately produce an
/// all-zero result; seeding handles that case with a fallback chain.
///
/// # Example
/// ```
/// use shardrand::EntropySource;
///
/// struct FixedEntropy;
/// impl EntropySource for FixedEntropy {
///     fn fill_entropy(&self, dest: &mut [u8]) {
///         dest.fill(0xa5);
///     }
/// }
///
/// let mut seed = [0u8; 16];
/// FixedEntropy.fill_entropy(&mut seed);
/// assert_eq!(seed, [0xa5; 16]);
/// ```
pub trait EntropySource {
    /// Fills `dest` with high-quality random bytes.
    fn fill_entropy(&self, dest: &mut [u8]);
}

impl<E: EntropySource + ?Sized> EntropySource for &E {
    fn fill_entropy(&self, dest: &mut [u8]) {
        (**self).fill_entropy(dest);
    }
}

/// An `EntropySource` that uses the thread-local RNG (`rand::rng()`).
///
/// The thread-local RNG is cryptographically secure (ChaCha-based), seeded
/// from the operating system and reseeded periodically. It is only consulted
/// once, to derive the root seed; the streams themselves are not secure.
///
/// This type does **not** store the RNG itself; it simply accesses the
/// thread-local generator on each call, so it may be freely shared across
/// threads.
#[cfg(feature = "thread-rng")]
#[derive(Default, Clone, Copy, Debug)]
pub struct ThreadRandom;

#[cfg(feature = "thread-rng")]
impl EntropySource for ThreadRandom {
    fn fill_entropy(&self, dest: &mut [u8]) {
        use rand::RngCore;
        rand::rng().fill_bytes(dest);
    }
}
