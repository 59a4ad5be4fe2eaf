mod breadth_first_sort;
mod counting_sort;
mod depth_first_sort;
mod inplace_sort;
mod insertion_sort;
#[cfg(feature = "multi-threaded")]
mod mt_inplace_sort;
#[cfg(feature = "multi-threaded")]
mod mt_sort;

pub use breadth_first_sort::*;
pub use counting_sort::*;
pub use depth_first_sort::*;
pub use inplace_sort::*;
pub use insertion_sort::*;
#[cfg(feature = "multi-threaded")]
pub use mt_inplace_sort::*;
#[cfg(feature = "multi-threaded")]
pub use mt_sort::*;
