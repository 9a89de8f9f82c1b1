use super::mutex::{MutexGuard, Slot, new_slot};
use super::seed::{SeedOrigin, derive_root_seed};
use super::unit::current_unit;
use crate::{
    EntropySource, Error, PseudoStream, Result, ScratchAllocator, StreamState, SystemAllocator,
    TimeSource,
};
use core::ops::{Deref, DerefMut};
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Per-execution-unit stream storage.
///
/// Holds one [`PseudoStream`] per execution unit. Each slot is seeded once from
/// a shared root seed by cumulative jump-ahead: unit `i` starts at the root
/// advanced by `i + 1` jumps, so any two units' streams are at least one jump
/// distance apart (2^64 steps for xorshift128+).
///
/// The unit count is fixed for the registry's lifetime.
///
/// ## Checkout discipline
///
/// A unit's stream may only be read or mutated through a [`UnitGuard`]
/// obtained from [`checkout`]. Because threads cannot be pinned to a core,
/// each slot is guarded by its own mutex; when every thread maps to its own
/// unit the lock is never contended and costs a single uncontended
/// acquire/release per fill.
///
/// ## Lifecycle
/// 1. [`init`] reserves the slots (fails with
///    [`Error::AllocationFailure`]).
/// 2. [`seed`] derives the root seed and seeds every slot.
/// 3. [`checkout`] / [`checkout_current`] hand out exclusive access.
/// 4. [`teardown`] (or drop) frees the storage. It is safe on a registry that
///    was never seeded.
///
/// # Example
/// ```
/// use shardrand::{MonotonicClock, StreamState, ThreadRandom, UnitRegistry};
///
/// let mut registry = UnitRegistry::<StreamState>::init(4).unwrap();
/// registry.seed(&ThreadRandom, &MonotonicClock::new());
///
/// let mut unit = registry.checkout(2).unwrap();
/// let mut buf = [0u8; 16];
/// shardrand::fill_bytes(&mut *unit, &mut buf);
/// ```
///
/// [`init`]: Self::init
/// [`seed`]: Self::seed
/// [`checkout`]: Self::checkout
/// [`checkout_current`]: Self::checkout_current
/// [`teardown`]: Self::teardown
pub struct UnitRegistry<S: PseudoStream = StreamState> {
    slots: Vec<Slot<S>>,
    seeded: bool,
}

impl<S: PseudoStream> UnitRegistry<S> {
    /// Reserves `units` unseeded slots from the global allocator.
    ///
    /// # Errors
    /// - [`Error::InvalidUnitCount`] if `units` is zero.
    /// - [`Error::AllocationFailure`] if the slots cannot be reserved.
    pub fn init(units: usize) -> Result<Self> {
        Self::init_in(units, &SystemAllocator)
    }

    /// Reserves one unseeded slot per available CPU.
    ///
    /// # Errors
    /// - [`Error::AllocationFailure`] if the slots cannot be reserved.
    pub fn with_available_units() -> Result<Self> {
        Self::init(num_cpus::get())
    }

    /// Reserves `units` unseeded slots using `alloc`.
    ///
    /// # Errors
    /// - [`Error::InvalidUnitCount`] if `units` is zero.
    /// - [`Error::AllocationFailure`] if `alloc` cannot reserve the slots.
    pub fn init_in<A: ScratchAllocator + ?Sized>(units: usize, alloc: &A) -> Result<Self> {
        if units == 0 {
            return Err(Error::InvalidUnitCount);
        }
        let mut slots = alloc.try_alloc(units)?;
        slots.extend((0..units).map(|_| new_slot(S::ZERO)));

        #[cfg(feature = "tracing")]
        tracing::debug!(generator = S::NAME, units, "registry allocated");

        Ok(Self {
            slots,
            seeded: false,
        })
    }

    /// Number of execution units (slots) in this registry.
    pub fn units(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` once [`Self::seed`] or [`Self::seed_from_root`] has run.
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Seeds every slot from a fresh root seed.
    ///
    /// The root seed comes from `entropy`, with the clock and a literal seed as
    /// fallbacks when the entropy source yields all zeroes. The root seed is
    /// not retained.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, fields(units = self.units())))]
    pub fn seed<E, T>(&mut self, entropy: &E, clock: &T) -> SeedOrigin
    where
        E: EntropySource + ?Sized,
        T: TimeSource<u64> + ?Sized,
    {
        let (root, origin) = derive_root_seed::<S, _, _>(entropy, clock);
        self.seed_slots(root);
        origin
    }

    /// Seeds every slot from an explicit root seed.
    ///
    /// Slot `i` receives `root` advanced by `i + 1` jumps. Two registries with
    /// the same root and unit count hold identical streams, which makes output
    /// reproducible.
    ///
    /// # Errors
    /// - [`Error::ZeroSeed`] if `root` is all zeroes. The registry is left
    ///   untouched.
    pub fn seed_from_root(&mut self, root: S) -> Result<()> {
        if root.is_zero() {
            return Err(Error::ZeroSeed);
        }
        self.seed_slots(root);
        Ok(())
    }

    // `root` must be non-zero.
    fn seed_slots(&mut self, root: S) {
        let mut running = root;
        for slot in &mut self.slots {
            running.jump();
            *slot = new_slot(running);
        }
        self.seeded = true;
    }

    /// Checks out unit `unit` for exclusive use.
    ///
    /// The stream is released (and its advanced state kept) when the returned
    /// guard is dropped.
    ///
    /// # Errors
    /// - [`Error::Unseeded`] if the registry has not been seeded.
    /// - [`Error::UnitOutOfRange`] if `unit >= self.units()`.
    /// - [`Error::LockPoisoned`] if a previous holder panicked (std mutexes
    ///   only).
    pub fn checkout(&self, unit: usize) -> Result<UnitGuard<'_, S>> {
        if !self.seeded {
            return Err(Error::Unseeded);
        }
        let slot = self.slots.get(unit).ok_or(Error::UnitOutOfRange {
            unit,
            units: self.units(),
        })?;

        #[cfg(not(feature = "parking-lot"))]
        let guard = slot.lock()?;
        #[cfg(feature = "parking-lot")]
        let guard = slot.lock();

        Ok(UnitGuard { guard, unit })
    }

    /// Checks out the calling thread's execution unit.
    ///
    /// See [`current_unit`](crate::current_unit) for how threads map to
    /// units; the id is reduced modulo [`Self::units`].
    ///
    /// # Errors
    /// Same as [`Self::checkout`], minus `UnitOutOfRange`.
    pub fn checkout_current(&self) -> Result<UnitGuard<'_, S>> {
        self.checkout(current_unit() % self.units())
    }

    /// Frees all slots.
    ///
    /// Equivalent to dropping the registry; safe whether or not it was
    /// seeded.
    pub fn teardown(self) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            generator = S::NAME,
            units = self.units(),
            seeded = self.seeded,
            "registry torn down"
        );
        drop(self);
    }
}

/// Exclusive access to one unit's stream.
///
/// Dereferences to the stream. Dropping the guard (or calling
/// [`release`](Self::release)) writes nothing extra: the slot is mutated in
/// place and becomes visible to the next checkout of the same unit.
pub struct UnitGuard<'a, S> {
    guard: MutexGuard<'a, S>,
    unit: usize,
}

impl<S> UnitGuard<'_, S> {
    /// The execution unit this guard belongs to.
    pub fn unit(&self) -> usize {
        self.unit
    }

    /// Releases the checkout.
    pub fn release(self) {
        drop(self);
    }
}

impl<S> Deref for UnitGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.guard
    }
}

impl<S> DerefMut for UnitGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.guard
    }
}
