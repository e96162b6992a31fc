pub mod math;
pub mod pool;

pub use pool::*;
