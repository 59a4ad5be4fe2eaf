//! The in-place engine: cyclic-shift scatter over a single buffer.
//!
//! Each pass counts the partition sizes, then walks the partitions in
//! order swapping every out-of-place record directly into the write
//! cursor of its home partition. A record moves at most once per pass,
//! and no scratch is needed beyond the `O(P)` cursor tables.
//!
//! ## Characteristics
//!
//!  * in-place
//!  * memory efficient
//!  * unstable below the `(fingerprint, key)` order
//!  * single-threaded
//!
//! ## Performance
//!
//! Loses to the out-of-place engines on streaming-friendly inputs, but
//! the `O(P)` footprint makes it the building block the parallel driver
//! uses to refine sub-partitions without allocating per worker.

use crate::geometry::refine_cutoff;
use crate::record::Record;
use crate::sorts::insertion_sort::insertion_sort;
use crate::utils::*;
use arbitrary_chunks::ArbitraryChunks;
use partition::partition_index;
use std::cmp::min;

/// Sort caller-materialized records by their full 64-bit fingerprint,
/// peeling `partition_bits` per pass.
pub fn inplace_sort<K: Ord, V>(bucket: &mut [Record<K, V>], partition_bits: u32) {
    inplace_refine(bucket, 64, partition_bits);
}

/// Refine one sub-partition whose records already agree on every
/// fingerprint bit above `remaining_bits`.
pub(crate) fn inplace_refine<K: Ord, V>(
    bucket: &mut [Record<K, V>],
    remaining_bits: u32,
    partition_bits: u32,
) {
    if bucket.len() < 2 {
        return;
    }

    if remaining_bits == 0 || bucket.len() < refine_cutoff(partition_bits) {
        insertion_sort(bucket);
        return;
    }

    let width = min(partition_bits, remaining_bits);
    let shift = remaining_bits - width;
    let partitions = 1usize << width;

    #[cfg(feature = "work_profiles")]
    println!("({}) INPLACE", remaining_bits);

    let mut counts = vec![0usize; partitions];
    let mut largest = 0;
    let mut largest_index = 0;

    for r in bucket.iter() {
        let b = ((r.hash >> shift) as usize) & (partitions - 1);
        counts[b] += 1;

        if counts[b] > largest {
            largest = counts[b];
            largest_index = b;
        }
    }

    if largest == bucket.len() {
        // Single occupied partition; nothing to permute at this depth.
        inplace_refine(bucket, remaining_bits - width, partition_bits);
        return;
    }

    let mut cursors = get_prefix_sums(&counts);
    let end_offsets = get_end_offsets(&counts, &cursors);

    if largest > bucket.len() / 2 {
        // Pre-partition the dominant bucket so the swap loop doesn't churn
        // records that are already where they belong.
        let li = largest_index;
        let in_place = partition_index(
            &mut bucket[cursors[li]..end_offsets[li]],
            |r| ((r.hash >> shift) as usize) & (partitions - 1) == li,
        );

        cursors[li] += in_place;
    }

    for b in 0..partitions {
        while cursors[b] < end_offsets[b] {
            let target = ((bucket[cursors[b]].hash >> shift) as usize) & (partitions - 1);

            if target == b {
                cursors[b] += 1;
            } else {
                let slot = cursors[target];
                cursors[target] += 1;
                bucket.swap(cursors[b], slot);
            }
        }
    }

    bucket
        .arbitrary_chunks_mut(&counts)
        .for_each(|chunk| inplace_refine(chunk, remaining_bits - width, partition_bits));
}
