//! Lifecycle hooks composing the registry and the read endpoint.
//!
//! [`Service::init`] allocates and seeds the registry; [`Service::device`]
//! hands out the read endpoint; [`Service::shutdown`] frees everything.

use crate::{
    EntropySource, PseudoRandomDevice, PseudoStream, Result, RetryPolicy, SeedOrigin, StreamState,
    SystemAllocator, TimeSource, UnitRegistry,
};

/// Runtime configuration for a [`Service`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Number of execution units (one independent stream per unit).
    pub units: usize,
    /// Retry policy for client copies.
    pub retry: RetryPolicy,
}

impl Default for ServiceConfig {
    /// One unit per available CPU and the default retry policy.
    fn default() -> Self {
        Self {
            units: num_cpus::get(),
            retry: RetryPolicy::default(),
        }
    }
}

impl ServiceConfig {
    /// Returns a copy with `units` replaced.
    pub fn with_units(mut self, units: usize) -> Self {
        self.units = units;
        self
    }

    /// Returns a copy with `retry` replaced.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// An initialized pseudorandom byte service.
///
/// Owns the per-unit registry. Endpoints borrow it, so the borrow checker
/// guarantees no read is in flight when [`Self::shutdown`] runs.
///
/// # Example
/// ```
/// use shardrand::{
///     MonotonicClock, Service, ServiceConfig, SliceSink, StreamState, ThreadRandom,
/// };
///
/// let service = Service::<StreamState>::init(
///     ServiceConfig::default().with_units(2),
///     &ThreadRandom,
///     &MonotonicClock::new(),
/// )
/// .unwrap();
///
/// let mut buf = [0u8; 100];
/// let n = service.device().read(&mut SliceSink::new(&mut buf), 100, 0).unwrap();
/// assert_eq!(n, 100);
///
/// service.shutdown();
/// ```
pub struct Service<S: PseudoStream = StreamState> {
    registry: UnitRegistry<S>,
    retry: RetryPolicy,
    origin: SeedOrigin,
}

impl<S: PseudoStream> Service<S> {
    /// Allocates and seeds the registry.
    ///
    /// # Errors
    /// - [`Error::InvalidUnitCount`](crate::Error::InvalidUnitCount) if
    ///   `config.units` is zero.
    /// - [`Error::AllocationFailure`](crate::Error::AllocationFailure) if the
    ///   registry cannot be allocated; nothing is seeded in that case.
    pub fn init<E, T>(config: ServiceConfig, entropy: &E, clock: &T) -> Result<Self>
    where
        E: EntropySource + ?Sized,
        T: TimeSource<u64> + ?Sized,
    {
        let mut registry = UnitRegistry::init(config.units)?;
        let origin = registry.seed(entropy, clock);

        #[cfg(feature = "tracing")]
        tracing::info!(
            generator = S::NAME,
            units = registry.units(),
            ?origin,
            "pseudorandom service initialized"
        );

        Ok(Self {
            registry,
            retry: config.retry,
            origin,
        })
    }

    /// The read endpoint.
    pub fn device(&self) -> PseudoRandomDevice<'_, S> {
        PseudoRandomDevice::with_parts(&self.registry, SystemAllocator, self.retry)
    }

    /// The underlying registry, for direct [`random_get_pseudo_bytes`] use.
    ///
    /// [`random_get_pseudo_bytes`]: crate::random_get_pseudo_bytes
    pub fn registry(&self) -> &UnitRegistry<S> {
        &self.registry
    }

    /// Where the root seed came from.
    pub fn seed_origin(&self) -> SeedOrigin {
        self.origin
    }

    /// Frees the registry.
    pub fn shutdown(self) {
        #[cfg(feature = "tracing")]
        tracing::info!(generator = S::NAME, "pseudorandom service shut down");
        self.registry.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntropySource, Error, SliceSink, TimeSource, Xoshiro256PlusPlus};

    struct ZeroEntropy;

    impl EntropySource for ZeroEntropy {
        fn fill_entropy(&self, dest: &mut [u8]) {
            dest.fill(0);
        }
    }

    struct FixedTime(u64);

    impl TimeSource<u64> for FixedTime {
        fn current_millis(&self) -> u64 {
            self.0
        }
    }

    #[test]
    fn init_reports_seed_origin() {
        let config = ServiceConfig::default().with_units(3);
        let service = Service::<StreamState>::init(config, &ZeroEntropy, &FixedTime(99)).unwrap();
        assert_eq!(service.seed_origin(), SeedOrigin::Clock);
        assert_eq!(service.registry().units(), 3);
        assert!(service.registry().is_seeded());
        service.shutdown();
    }

    #[test]
    fn init_rejects_zero_units() {
        let config = ServiceConfig::default().with_units(0);
        let err = Service::<StreamState>::init(config, &ZeroEntropy, &FixedTime(0))
            .err()
            .unwrap();
        assert_eq!(err, Error::InvalidUnitCount);
    }

    #[test]
    fn xoshiro_service_serves_reads() {
        let config = ServiceConfig::default().with_units(2);
        let service =
            Service::<Xoshiro256PlusPlus>::init(config, &ZeroEntropy, &FixedTime(0)).unwrap();
        assert_eq!(service.seed_origin(), SeedOrigin::Literal);

        let mut buf = [0u8; 4097];
        let n = service
            .device()
            .read(&mut SliceSink::new(&mut buf), 4097, 0)
            .unwrap();
        assert_eq!(n, 4097);
        assert!(buf.iter().any(|&b| b != 0));
    }
}
