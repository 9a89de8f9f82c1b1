//! Execution unit identity for the calling thread.
//!
//! User-space threads cannot stay on one CPU core, so an execution unit here
//! is a stable per-thread id. Threads are assigned ids round-robin on first
//! use; [`pin_current_unit`] overrides the assignment, for example to match a
//! core-affinity layout. Registries reduce the id modulo their unit count.

use core::cell::Cell;
use portable_atomic::{AtomicUsize, Ordering};

static NEXT_UNIT: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static CURRENT_UNIT: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Returns the execution unit id of the calling thread.
///
/// The first call on a thread assigns the next id from a process-wide
/// counter; later calls return the same id.
pub fn current_unit() -> usize {
    CURRENT_UNIT.with(|unit| {
        unit.get().unwrap_or_else(|| {
            let id = NEXT_UNIT.fetch_add(1, Ordering::Relaxed);
            unit.set(Some(id));
            id
        })
    })
}

/// Pins the calling thread to execution unit `unit`.
pub fn pin_current_unit(unit: usize) {
    CURRENT_UNIT.with(|current| current.set(Some(unit)));
}
