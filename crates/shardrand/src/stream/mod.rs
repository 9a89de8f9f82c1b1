mod interface;
mod xorshift;
mod xoshiro;

pub use interface::*;
pub use xorshift::*;
pub use xoshiro::*;
