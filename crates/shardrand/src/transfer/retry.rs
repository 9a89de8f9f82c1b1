use core::time::Duration;

/// Backoff strategies applied between copy attempts that made no progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Busy-waits with a spin-loop hint.
    ///
    /// Lowest latency, highest CPU usage.
    Spin,

    /// Yields to the OS scheduler so the client side can drain.
    Yield,

    /// Sleeps for the given duration.
    ///
    /// Lowest CPU usage, but may oversleep depending on platform-specific
    /// scheduler resolution.
    Sleep(Duration),
}

impl Backoff {
    /// Waits according to the strategy.
    pub fn wait(self) {
        match self {
            Self::Spin => core::hint::spin_loop(),
            Self::Yield => std::thread::yield_now(),
            Self::Sleep(duration) => std::thread::sleep(duration),
        }
    }
}

/// How long a bulk transfer keeps retrying a copy primitive that makes no
/// progress.
///
/// Partial copies are always retried for the remaining range and reset the
/// stall counter. Only consecutive zero-byte copies count against
/// `max_stalls`; once exceeded, the transfer fails with
/// [`Error::CopyStalled`](crate::Error::CopyStalled).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Consecutive zero-progress copies tolerated before giving up.
    pub max_stalls: u32,
    /// Wait applied after each zero-progress copy.
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Default number of tolerated consecutive zero-progress copies.
    pub const DEFAULT_MAX_STALLS: u32 = 64;

    /// Creates a policy.
    pub const fn new(max_stalls: u32, backoff: Backoff) -> Self {
        Self {
            max_stalls,
            backoff,
        }
    }

    /// Returns a copy with `max_stalls` replaced.
    pub const fn with_max_stalls(mut self, max_stalls: u32) -> Self {
        self.max_stalls = max_stalls;
        self
    }

    /// Returns a copy with `backoff` replaced.
    pub const fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_STALLS, Backoff::Yield)
    }
}
