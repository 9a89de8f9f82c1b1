use super::{ClientSink, RetryPolicy};
use crate::{Error, PseudoStream, Result, ScratchAllocator, UnitRegistry, fill_bytes};
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Size of one generated output word in bytes.
pub const WORD_BYTES: usize = size_of::<u64>();

/// Generates `len` pseudorandom bytes and delivers them to `sink`.
///
/// The steps are:
/// 1. `sink.check_access(len)`; on failure nothing is allocated or
///    generated.
/// 2. A scratch buffer of `len` rounded up to a whole number of words is
///    reserved through `alloc`.
/// 3. The calling thread's unit is checked out and the whole scratch buffer
///    is filled from its stream, then the unit is released.
/// 4. The first `len` bytes are delivered with [`deliver`], retrying partial
///    copies.
///
/// The scratch buffer is freed on every exit path. Because generation always
/// covers whole words, a `len` that is not a multiple of [`WORD_BYTES`] takes
/// the first bytes of the final serialized word.
///
/// Returns `len` on success.
///
/// # Errors
/// - [`Error::AccessFault`] if the destination cannot take `len` bytes.
/// - [`Error::AllocationFailure`] if the scratch buffer cannot be reserved.
/// - [`Error::Unseeded`] / [`Error::LockPoisoned`] from the checkout.
/// - [`Error::CopyFault`] / [`Error::CopyStalled`] from delivery.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip(registry, sink, alloc, retry)))]
pub fn transfer<S, C, A>(
    registry: &UnitRegistry<S>,
    sink: &mut C,
    len: usize,
    alloc: &A,
    retry: &RetryPolicy,
) -> Result<usize>
where
    S: PseudoStream,
    C: ClientSink + ?Sized,
    A: ScratchAllocator + ?Sized,
{
    sink.check_access(len)?;

    let rounded = len
        .checked_next_multiple_of(WORD_BYTES)
        .ok_or(Error::AllocationFailure { requested: len })?;
    let mut scratch = alloc.try_alloc::<u8>(rounded)?;
    scratch.resize(rounded, 0);

    {
        let mut unit = registry.checkout_current()?;
        fill_bytes(&mut *unit, &mut scratch);
    }

    deliver(sink, &scratch[..len], retry)
}

/// Copies all of `src` to `sink`, retrying partial transfers.
///
/// Each attempt offers the remaining range. A copy that moves some bytes
/// resets the stall counter; a copy that moves none waits per
/// `retry.backoff` and fails once more than `retry.max_stalls` happen in a
/// row.
///
/// # Errors
/// - [`Error::CopyFault`] if the sink reports a permanent fault.
/// - [`Error::CopyStalled`] if the sink stops making progress.
pub fn deliver<C>(sink: &mut C, src: &[u8], retry: &RetryPolicy) -> Result<usize>
where
    C: ClientSink + ?Sized,
{
    let mut delivered = 0;
    let mut stalls = 0u32;

    while delivered < src.len() {
        let copied = sink
            .copy_from(delivered, &src[delivered..])
            .map_err(|fault| Error::CopyFault {
                delivered,
                kind: fault.kind,
            })?;

        if copied == 0 {
            stalls += 1;
            if stalls > retry.max_stalls {
                #[cfg(feature = "tracing")]
                tracing::debug!(delivered, requested = src.len(), "copy stalled; giving up");
                return Err(Error::CopyStalled {
                    delivered,
                    requested: src.len(),
                });
            }
            #[cfg(feature = "tracing")]
            tracing::trace!(delivered, stalls, "copy made no progress; backing off");
            retry.backoff.wait();
            continue;
        }

        stalls = 0;
        delivered += copied.min(src.len() - delivered);
    }

    Ok(delivered)
}
