//! Error types for the pseudorandom byte service.
//!
//! Every failure in this crate is returned to the caller; nothing here is
//! fatal to the process. A degenerate (all-zero) seed is not an error: it is
//! recovered during seeding and only reported as a diagnostic.
//!
//! ## Error Cases
//! - `AllocationFailure`: registry or scratch storage could not be reserved.
//! - `AccessFault`: the client destination is not writable for the requested
//!   length.
//! - `CopyFault`: the copy primitive reported a permanent fault mid-transfer.
//! - `CopyStalled`: the copy primitive stopped making progress.
//! - `Unseeded`: a stream was checked out before seeding completed.
//! - `UnitOutOfRange`: an explicit checkout named a unit the registry does not
//!   have.
//! - `InvalidUnitCount`: a registry was requested with zero units.
//! - `ZeroSeed`: an explicit root seed was all zeroes.
//! - `LockPoisoned`: a per-unit lock was poisoned (std mutexes only).

use std::io;
use thiserror::Error;

/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// `EIO`: I/O error.
pub const EIO: i32 = 5;
/// `EAGAIN`: resource temporarily unavailable.
pub const EAGAIN: i32 = 11;
/// `ENOMEM`: cannot allocate memory.
pub const ENOMEM: i32 = 12;
/// `EFAULT`: bad address.
pub const EFAULT: i32 = 14;
/// `EINVAL`: invalid argument.
pub const EINVAL: i32 = 22;

/// All error variants that `shardrand` can emit.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Storage for the registry or a scratch buffer could not be reserved.
    #[error("failed to allocate {requested} elements")]
    AllocationFailure {
        /// Number of elements that were requested.
        requested: usize,
    },

    /// The client destination cannot hold the requested number of bytes.
    #[error("destination not writable for {requested} bytes (only {available} accessible)")]
    AccessFault {
        /// Number of bytes the caller asked for.
        requested: usize,
        /// Number of bytes the destination can actually accept.
        available: usize,
    },

    /// The copy primitive failed permanently after `delivered` bytes.
    #[error("copy to client faulted after {delivered} bytes: {kind}")]
    CopyFault {
        /// Bytes already delivered to the client before the fault.
        delivered: usize,
        /// The underlying failure reported by the copy primitive.
        kind: io::ErrorKind,
    },

    /// The copy primitive made no progress for too many consecutive attempts.
    #[error("copy to client stalled after {delivered} of {requested} bytes")]
    CopyStalled {
        /// Bytes already delivered to the client before giving up.
        delivered: usize,
        /// Total number of bytes that should have been delivered.
        requested: usize,
    },

    /// The registry has not been seeded yet.
    #[error("registry has not been seeded")]
    Unseeded,

    /// The requested execution unit does not exist in this registry.
    #[error("unit {unit} is out of range for a registry of {units} units")]
    UnitOutOfRange {
        /// The unit that was requested.
        unit: usize,
        /// Number of units in the registry.
        units: usize,
    },

    /// A registry needs at least one execution unit.
    #[error("a registry needs at least one execution unit")]
    InvalidUnitCount,

    /// An explicit root seed was all zeroes, the fixed point of every stream.
    #[error("root seed must not be all zeroes")]
    ZeroSeed,

    /// The operation failed because a per-unit lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding a checkout. When the
    /// `parking-lot` feature is enabled, mutexes do **not** poison, so this
    /// variant is never produced.
    #[error("per-unit lock poisoned")]
    LockPoisoned,
}

impl Error {
    /// Returns the positive `errno` value matching this error.
    ///
    /// The read endpoint reports failures as `-errno`.
    pub const fn errno(&self) -> i32 {
        match self {
            Self::AllocationFailure { .. } => ENOMEM,
            Self::AccessFault { .. } | Self::CopyFault { .. } => EFAULT,
            Self::CopyStalled { .. } | Self::LockPoisoned => EIO,
            Self::Unseeded => EAGAIN,
            Self::UnitOutOfRange { .. } | Self::InvalidUnitCount | Self::ZeroSeed => EINVAL,
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        let kind = match &err {
            Error::AllocationFailure { .. } => io::ErrorKind::OutOfMemory,
            Error::AccessFault { .. }
            | Error::UnitOutOfRange { .. }
            | Error::InvalidUnitCount
            | Error::ZeroSeed => io::ErrorKind::InvalidInput,
            Error::CopyFault { kind, .. } => *kind,
            Error::CopyStalled { .. } => io::ErrorKind::WriteZero,
            Error::Unseeded => io::ErrorKind::WouldBlock,
            Error::LockPoisoned => io::ErrorKind::Other,
        };
        Self::new(kind, err)
    }
}

#[cfg(not(feature = "parking-lot"))]
use crate::registry::{MutexGuard, PoisonError};

// Convert all poisoned lock errors to a simplified `LockPoisoned`
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
