//! # hashsort
//!
//! hashsort is a family of hash-partitioning sorters: it fingerprints each
//! key with an injected 64-bit hash and reorders the records so that equal
//! fingerprint prefixes form contiguous runs. Downstream equi-join and
//! group-by operators get their colocation guarantee; total ordering by
//! key is explicitly not the goal (keys only break fingerprint ties).
//!
//! ## Usage
//!
//! ```ignore
//! use hashsort::{sort_into, Record};
//!
//! let pairs: Vec<(u64, u64)> = vec![(17, 1), (3, 2), (9, 3)];
//! let mut out = vec![Record::new(0, 0, 0); pairs.len()];
//!
//! sort_into(&pairs, &mut out, &|k| *k);
//! ```
//!
//! The in-place variants expect the caller to materialize records first:
//!
//! ```ignore
//! use hashsort::{materialize, sort_in_place};
//!
//! let mut records = materialize(&pairs, |k| *k);
//! sort_in_place(&mut records);
//! ```
//!
//! ## Engines
//!
//! Four engines share the counting kernel and the insertion refiner:
//!
//!  * `sort_into`: sequential, two ping-pong scratch buffers; chooses a
//!    depth-first or breadth-first traversal by record weight
//!  * `par_sort_into`: parallel, barrier-synchronized counting phase and
//!    lock-free disjoint scatter
//!  * `sort_in_place`: sequential cyclic-shift permutation, `O(P)` extra
//!    memory
//!  * `par_sort_in_place`: parallel cyclic shift under per-partition
//!    locks
//!
//! Every engine also has a `_with` form taking an explicit [`SortConfig`]
//! (partition width, mask window, nosort bits). The direct engine entry
//! points live in [`sorts`] for callers that want to pick a traversal
//! themselves.
//!
//! ## License
//!
//! Licensed under either of
//!
//! * Apache License, Version 2.0, ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)
//!
//! at your option.


#[cfg(feature = "multi-threaded")]
mod barrier;
mod geometry;
mod record;
mod sort;
pub mod sorts;
mod utils;

#[cfg(feature = "multi-threaded")]
pub use barrier::ThreadBarrier;
pub use geometry::{
    ceil_log2, low_mask, optimal_partition_bits, SortConfig, MAX_PARTITION_BITS,
    MIN_PARTITION_BITS,
};
pub use record::{materialize, Record};
pub use sort::*;
