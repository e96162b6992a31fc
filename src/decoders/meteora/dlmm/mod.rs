pub mod bin_array;
pub mod math;
pub mod pool;

pub use bin_array::{DecodedBin, DecodedBinArray, MAX_BIN_PER_ARRAY};
pub use pool::*;
