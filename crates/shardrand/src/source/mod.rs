mod entropy;
mod time;

pub use entropy::*;
pub use time::*;
