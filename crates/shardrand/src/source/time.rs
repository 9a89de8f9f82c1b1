use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// A trait for coarse time sources.
///
/// Seeding only reads the clock when the entropy source returned all zeroes,
/// so resolution does not matter; what matters is that the reading is usually
/// non-zero. The unit is expected to be **milliseconds** relative to a
/// source-defined origin.
///
/// # Example
///
/// ```
/// use shardrand::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource<u64> for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource<T> {
    /// Returns the current time in milliseconds since the source's origin.
    fn current_millis(&self) -> T;
}

impl<T, C: TimeSource<T> + ?Sized> TimeSource<T> for &C {
    fn current_millis(&self) -> T {
        (**self).current_millis()
    }
}

/// A coarse monotonic time source counting milliseconds.
///
/// The wall clock is read once, at construction, to anchor the origin near
/// the Unix epoch; every later reading adds the elapsed [`Instant`] time to
/// that anchor, so readings never go backward even if the system clock is
/// adjusted. A system clock set before 1970 anchors at zero, and a reading
/// taken in the same millisecond then sends seeding to the literal fallback
/// seed.
///
/// # Example
/// ```
/// use shardrand::{MonotonicClock, TimeSource};
///
/// let clock = MonotonicClock::new();
/// let first = clock.current_millis();
/// assert!(clock.current_millis() >= first);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    start: Instant,
    epoch_offset: u64, // in milliseconds
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Anchors a new clock at the current wall-clock time.
    pub fn new() -> Self {
        let epoch_offset = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis() as u64);
        Self {
            start: Instant::now(),
            epoch_offset,
        }
    }
}

impl TimeSource<u64> for MonotonicClock {
    fn current_millis(&self) -> u64 {
        self.epoch_offset
            .saturating_add(self.start.elapsed().as_millis() as u64)
    }
}
