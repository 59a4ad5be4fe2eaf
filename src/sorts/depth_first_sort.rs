//! The depth-first out-of-place engine.
//!
//! Pass 0 scatters the input into the first scratch buffer. From there,
//! one partition subtree is refined at a time: the current sub-partition
//! is scattered into the other scratch buffer (ping-pong by depth
//! parity), its children are visited, and only then does the cursor move
//! to the next sibling. The final depth scatters into the destination.
//!
//! ## Characteristics
//!
//!  * out-of-place (two scratch buffers)
//!  * unstable below the `(fingerprint, key)` order
//!  * single-threaded
//!
//! ## Performance
//!
//! The active working set is a single root-to-leaf path, so this engine
//! wins when records are heavy (string keys, wide values) and a whole
//! breadth-first sweep would thrash the cache.

use crate::geometry::{refine_cutoff, SortConfig};
use crate::record::Record;
use crate::sorts::counting_sort::*;
use crate::sorts::insertion_sort::insertion_sort;
use crate::utils::*;
use arbitrary_chunks::ArbitraryChunks;

pub fn depth_first_sort<K, V, H>(
    src: &[(K, V)],
    dst: &mut [Record<K, V>],
    hasher: &H,
    config: &SortConfig,
) where
    K: Clone + Ord,
    V: Clone,
    H: Fn(&K) -> u64,
{
    let n = src.len();
    debug_assert!(dst.len() >= n);

    match config.num_passes() {
        0 => return materialize_unordered(src, dst, hasher),
        1 => return single_pass_sort(src, &mut dst[..n], hasher, config),
        _ => {}
    }

    let mut scratch = uninit_scratch(n);
    let counts = materialize_scatter(
        src,
        &mut scratch,
        hasher,
        config.pass_mask(0),
        config.pass_shift(0),
        config.pass_partitions(0),
    );

    // Safety: the pass-0 counts sum to n, so every slot was written.
    let mut front = unsafe { assume_filled(scratch) };

    // The second scratch buffer is only touched by intermediate passes,
    // which exist from three passes up.
    let mut back = if config.num_passes() >= 3 {
        front.clone()
    } else {
        Vec::new()
    };

    let dst = &mut dst[..n];
    let mut base = 0;
    for c in counts {
        refine(&mut front, &mut back, dst, config, 1, base, base + c);
        base += c;
    }
}

/// Refine one sub-partition of the depth-`depth` frontier. The records
/// live in the scratch buffer written at `depth - 1`.
fn refine<K, V>(
    front: &mut Vec<Record<K, V>>,
    back: &mut Vec<Record<K, V>>,
    dst: &mut [Record<K, V>],
    config: &SortConfig,
    depth: u32,
    lo: usize,
    hi: usize,
) where
    K: Clone + Ord,
    V: Clone,
{
    if hi == lo {
        return;
    }

    if hi - lo == 1 {
        let r = if depth % 2 == 1 { &front[lo] } else { &back[lo] };
        dst[lo] = r.clone();
        return;
    }

    #[cfg(feature = "work_profiles")]
    println!("({}) DF [{}, {})", depth, lo, hi);

    // Small subtrees are cheaper to finish by insertion than to keep
    // partitioning.
    if hi - lo < refine_cutoff(config.partition_bits) {
        let run = if depth % 2 == 1 {
            &front[lo..hi]
        } else {
            &back[lo..hi]
        };
        dst[lo..hi].clone_from_slice(run);
        insertion_sort(&mut dst[lo..hi]);
        return;
    }

    let mask = config.pass_mask(depth);
    let shift = config.pass_shift(depth);
    let partitions = config.pass_partitions(depth);
    let last = config.num_passes() - 1;

    if depth == last {
        let run = if depth % 2 == 1 {
            &front[lo..hi]
        } else {
            &back[lo..hi]
        };
        let counts = counting_scatter(run, &mut dst[lo..hi], mask, shift, partitions);

        if config.nosort_bits == 0 {
            dst[lo..hi]
                .arbitrary_chunks_mut(&counts)
                .for_each(insertion_sort);
        }
        return;
    }

    let counts = {
        let (run, target) = if depth % 2 == 1 {
            (&front[lo..hi], &mut back[lo..hi])
        } else {
            (&back[lo..hi], &mut front[lo..hi])
        };

        counting_scatter(run, target, mask, shift, partitions)
    };

    let mut base = lo;
    for c in counts {
        refine(front, back, dst, config, depth + 1, base, base + c);
        base += c;
    }
}
