mod bulk;
mod retry;
mod sink;

pub use bulk::*;
pub use retry::*;
pub use sink::*;
