//! Byte-level output of the per-unit streams.
//!
//! Every 64-bit output is serialized in a fixed byte order chosen by the
//! generator (big-endian for xorshift128+), independent of the host byte
//! order, so a given state always produces the same bytes on every platform.

use crate::{PseudoStream, Result, UnitRegistry};
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Fills `dest` with pseudorandom bytes by stepping `stream`.
///
/// Each output word is serialized with [`PseudoStream::emit_word`]
/// (most-significant byte first unless the generator says otherwise). If
/// `dest.len()` is not a multiple of eight, the last word contributes only as
/// many bytes as are needed (see [`PseudoStream::emit_partial`]); nothing past
/// `dest.len()` is written. The stream advances by `dest.len().div_ceil(8)`
/// steps.
///
/// # Example
/// ```
/// use shardrand::{PseudoStream, StreamState, fill_bytes};
///
/// let mut a = StreamState::new(1, 2);
/// let mut b = a;
///
/// let mut buf = [0u8; 8];
/// fill_bytes(&mut a, &mut buf);
/// assert_eq!(buf, b.step().to_be_bytes());
/// ```
pub fn fill_bytes<S: PseudoStream>(stream: &mut S, dest: &mut [u8]) {
    let mut words = dest.chunks_exact_mut(size_of::<u64>());
    for chunk in &mut words {
        chunk.copy_from_slice(&S::emit_word(stream.step()));
    }
    let tail = words.into_remainder();
    if !tail.is_empty() {
        S::emit_partial(stream.step(), tail);
    }
}

/// Fills `dest` with pseudorandom bytes from the calling thread's unit.
///
/// The unit is checked out for the duration of the fill and released before
/// returning. The bytes are **not** suitable for keys, nonces or any other
/// secret material.
///
/// # Errors
/// - [`Error::Unseeded`](crate::Error::Unseeded) if the registry has not been
///   seeded.
/// - [`Error::LockPoisoned`](crate::Error::LockPoisoned) if the unit's lock is
///   poisoned.
#[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all, fields(len = dest.len())))]
pub fn random_get_pseudo_bytes<S: PseudoStream>(
    registry: &UnitRegistry<S>,
    dest: &mut [u8],
) -> Result<()> {
    let mut unit = registry.checkout_current()?;
    fill_bytes(&mut *unit, dest);
    Ok(())
}
