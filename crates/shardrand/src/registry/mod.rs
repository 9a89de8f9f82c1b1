mod mutex;
mod per_unit;
mod seed;
mod unit;

#[cfg(not(feature = "parking-lot"))]
pub(crate) use mutex::{MutexGuard, PoisonError};
pub use per_unit::*;
pub use seed::*;
pub use unit::*;
