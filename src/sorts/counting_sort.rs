use crate::geometry::SortConfig;
use crate::record::Record;
use crate::sorts::insertion_sort::insertion_sort;
use crate::utils::*;
use arbitrary_chunks::ArbitraryChunks;
use std::mem::MaybeUninit;

/// Count how many records of `src` land in each of `partitions` buckets
/// for one `(mask, shift)` pass.
#[inline]
pub fn get_counts<K, V>(
    src: &[Record<K, V>],
    mask: u64,
    shift: u32,
    partitions: usize,
) -> Vec<usize> {
    let mut counts = vec![0usize; partitions];

    for r in src {
        counts[((r.hash & mask) >> shift) as usize] += 1;
    }

    counts
}

/// One full counting-sort pass over materialized records: count, exclusive
/// prefix-sum, scatter. `dst` must be exactly as long as `src`. Returns the
/// per-partition counts so the caller can locate the sub-partitions.
pub fn counting_scatter<K, V>(
    src: &[Record<K, V>],
    dst: &mut [Record<K, V>],
    mask: u64,
    shift: u32,
    partitions: usize,
) -> Vec<usize>
where
    K: Clone,
    V: Clone,
{
    debug_assert_eq!(src.len(), dst.len());

    let counts = get_counts(src, mask, shift, partitions);
    let mut cursors = get_prefix_sums(&counts);

    for r in src {
        let b = ((r.hash & mask) >> shift) as usize;
        dst[cursors[b]] = r.clone();
        cursors[b] += 1;
    }

    counts
}

/// The materializing pass: hash each input key during the count, then hash
/// it again during the scatter while building the `(h, k, v)` triple. The
/// input is read exactly twice and the scratch is written exactly once per
/// slot, which is what makes `assume_filled` on the caller's side sound.
pub fn materialize_scatter<K, V, H>(
    src: &[(K, V)],
    out: &mut [MaybeUninit<Record<K, V>>],
    hasher: &H,
    mask: u64,
    shift: u32,
    partitions: usize,
) -> Vec<usize>
where
    K: Clone,
    V: Clone,
    H: Fn(&K) -> u64,
{
    debug_assert_eq!(src.len(), out.len());

    let mut counts = vec![0usize; partitions];
    for (k, _) in src {
        counts[((hasher(k) & mask) >> shift) as usize] += 1;
    }

    let mut cursors = get_prefix_sums(&counts);
    for (k, v) in src {
        let h = hasher(k);
        let b = ((h & mask) >> shift) as usize;
        out[cursors[b]].write(Record::new(h, k.clone(), v.clone()));
        cursors[b] += 1;
    }

    counts
}

/// Degenerate geometry: the whole sort fits in one pass, so materialize
/// straight into the destination and polish each bucket run.
pub fn single_pass_sort<K, V, H>(
    src: &[(K, V)],
    dst: &mut [Record<K, V>],
    hasher: &H,
    config: &SortConfig,
) where
    K: Clone + Ord,
    V: Clone,
    H: Fn(&K) -> u64,
{
    let mask = config.pass_mask(0);
    let shift = config.pass_shift(0);

    let mut counts = vec![0usize; config.pass_partitions(0)];
    for (k, _) in src {
        counts[((hasher(k) & mask) >> shift) as usize] += 1;
    }

    let mut cursors = get_prefix_sums(&counts);
    for (k, v) in src {
        let h = hasher(k);
        let b = ((h & mask) >> shift) as usize;
        dst[cursors[b]] = Record::new(h, k.clone(), v.clone());
        cursors[b] += 1;
    }

    if config.nosort_bits == 0 {
        dst[..src.len()]
            .arbitrary_chunks_mut(&counts)
            .for_each(insertion_sort);
    }
}

/// Copy-through for geometry with zero passes: everything below
/// `nosort_bits`, so order is left to the caller's refiner (if any).
pub fn materialize_unordered<K, V, H>(src: &[(K, V)], dst: &mut [Record<K, V>], hasher: &H)
where
    K: Clone,
    V: Clone,
    H: Fn(&K) -> u64,
{
    for ((k, v), slot) in src.iter().zip(dst.iter_mut()) {
        *slot = Record::new(hasher(k), k.clone(), v.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::materialize;
    use crate::utils::test_utils::identity_pairs;

    #[test]
    fn counts_cover_every_record() {
        let recs = materialize(&identity_pairs(&[3, 1, 255, 0, 128]), |k| *k);
        let counts = get_counts(&recs, 0xff, 4, 16);

        assert_eq!(counts.iter().sum::<usize>(), 5);
        assert_eq!(counts[0], 3); // 3, 1, 0
        assert_eq!(counts[15], 1); // 255
        assert_eq!(counts[8], 1); // 128
    }

    #[test]
    fn scatter_groups_by_bucket() {
        let recs = materialize(&identity_pairs(&[0x21, 0x10, 0x22, 0x11]), |k| *k);
        let mut dst = recs.clone();
        let counts = counting_scatter(&recs, &mut dst, 0xff, 4, 16);

        assert_eq!(counts[1], 2);
        assert_eq!(counts[2], 2);
        let keys: Vec<u64> = dst.iter().map(|r| r.key).collect();
        assert_eq!(keys, vec![0x10, 0x11, 0x21, 0x22]);
    }

    #[test]
    fn single_pass_sorts_and_breaks_ties() {
        let src = identity_pairs(&[9, 2, 9, 1, 5]);
        let mut dst = materialize(&src, |k| *k);
        let config = crate::geometry::SortConfig {
            mask_bits: 4,
            partition_bits: 4,
            nosort_bits: 0,
        };

        single_pass_sort(&src, &mut dst, &|k| *k, &config);

        let keys: Vec<u64> = dst.iter().map(|r| r.key).collect();
        assert_eq!(keys, vec![1, 2, 5, 9, 9]);
    }
}
