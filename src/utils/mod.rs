mod sort_utils;

pub use sort_utils::*;

#[cfg(feature = "multi-threaded")]
mod shared_slice;

#[cfg(feature = "multi-threaded")]
pub(crate) use shared_slice::SharedSlice;

#[cfg(test)]
pub mod test_utils;
