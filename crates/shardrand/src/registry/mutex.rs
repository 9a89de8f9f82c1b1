#[cfg(feature = "parking-lot")]
pub(crate) use parking_lot::{Mutex, MutexGuard};
#[cfg(not(feature = "parking-lot"))]
pub(crate) use std::sync::{Mutex, MutexGuard, PoisonError};

/// Storage for one unit's stream.
///
/// With `cache-padded`, each slot sits on its own cache line so neighbouring
/// units never contend on the same line.
#[cfg(feature = "cache-padded")]
pub(crate) type Slot<S> = crossbeam_utils::CachePadded<Mutex<S>>;
#[cfg(not(feature = "cache-padded"))]
pub(crate) type Slot<S> = Mutex<S>;

pub(crate) fn new_slot<S>(state: S) -> Slot<S> {
    let slot = Mutex::new(state);
    #[cfg(feature = "cache-padded")]
    let slot = crossbeam_utils::CachePadded::new(slot);
    slot
}
