//! # shardrand
//!
//! Per-execution-unit pseudorandom byte streams built on xorshift128+.
//!
//! Every execution unit (a thread, mapped onto a fixed number of slots) owns
//! its own stream. Streams are seeded from one root seed by cumulative
//! jump-ahead, so unit `i` starts `(i + 1) * 2^64` steps into the root
//! stream and no two units overlap in practice. Output is serialized in a
//! fixed byte order (big-endian for xorshift128+) and is bit-for-bit
//! reproducible from a given state.
//!
//! # Security
//!
//! **Nothing in this crate is cryptographically secure.** The streams are
//! linear generators whose state can be reconstructed from a few outputs. Use
//! them for scratch buffers, simulation noise and other non-secret randomness;
//! never for keys, nonces, salts, tokens or passwords.
//!
//! # Components
//!
//! - [`StreamState`] / [`transition`] / [`jump`]: the xorshift128+ algorithm.
//!   [`Xoshiro256PlusPlus`] is a larger-state alternative.
//! - [`UnitRegistry`]: per-unit stream storage with init, seed, checkout and
//!   teardown.
//! - [`fill_bytes`] / [`random_get_pseudo_bytes`]: byte-fill service.
//! - [`transfer`] / [`deliver`]: bulk generation into a scratch buffer and
//!   delivery to a [`ClientSink`] with partial-copy retries.
//! - [`PseudoRandomDevice`]: a read-style endpoint; [`Service`] wires it all
//!   together.
//!
//! # Example
//!
//! ```
//! use shardrand::{MonotonicClock, Service, ServiceConfig, StreamState, ThreadRandom};
//! use std::io::Read;
//!
//! let clock = MonotonicClock::new();
//! let service =
//!     Service::<StreamState>::init(ServiceConfig::default(), &ThreadRandom, &clock).unwrap();
//!
//! let mut noise = [0u8; 64];
//! shardrand::random_get_pseudo_bytes(service.registry(), &mut noise).unwrap();
//!
//! let mut more = Vec::new();
//! (&service.device()).take(1 << 16).read_to_end(&mut more).unwrap();
//! assert_eq!(more.len(), 1 << 16);
//! ```
//!
//! # Features
//!
//! - `thread-rng` (default): [`ThreadRandom`], an entropy source backed by
//!   `rand::rng()`.
//! - `parking-lot`: per-unit locks from `parking_lot` (no poisoning).
//! - `cache-padded`: pads each unit's slot to a cache line.
//! - `tracing`: diagnostics and spans via `tracing`.

mod alloc;
mod device;
mod error;
mod fill;
mod registry;
mod service;
mod source;
mod stream;
mod transfer;

#[cfg(test)]
mod tests;

pub use crate::alloc::*;
pub use crate::device::*;
pub use crate::error::*;
pub use crate::fill::*;
pub use crate::registry::*;
pub use crate::service::*;
pub use crate::source::*;
pub use crate::stream::*;
pub use crate::transfer::*;
