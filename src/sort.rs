//! The public entry points.
//!
//! Four engines, each callable with an automatically chosen geometry or an
//! explicit [`SortConfig`]. The out-of-place pair hashes during its first
//! scatter; the in-place pair expects the caller to have materialized
//! records already (see [`materialize`](crate::record::materialize)).

use crate::geometry::{SortConfig, MAX_PARTITION_BITS, MIN_PARTITION_BITS};
use crate::record::Record;
use crate::sorts::*;
use std::mem;

#[cfg(feature = "multi-threaded")]
fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
}

fn check_contract(input_len: usize, output_len: usize, config: &SortConfig) {
    assert!(
        output_len >= input_len,
        "output buffer ({}) shorter than input ({})",
        output_len,
        input_len
    );
    assert!(
        (MIN_PARTITION_BITS..=MAX_PARTITION_BITS).contains(&config.partition_bits),
        "partition_bits must be within [{}, {}], got {}",
        MIN_PARTITION_BITS,
        MAX_PARTITION_BITS,
        config.partition_bits
    );
}

/// Inputs this small skip the partitioning machinery entirely.
const COMPARATIVE_CUTOFF: usize = 128;

fn comparative_sort<K, V, H>(src: &[(K, V)], dst: &mut [Record<K, V>], hasher: &H)
where
    K: Clone + Ord,
    V: Clone,
    H: Fn(&K) -> u64,
{
    materialize_unordered(src, dst, hasher);
    insertion_sort(&mut dst[..src.len()]);
}

/// Sequential out-of-place sort with automatic geometry.
///
/// Picks the engine by record weight: streaming breadth-first for small
/// records, working-set-friendly depth-first for heavy ones.
pub fn sort_into<K, V, H>(src: &[(K, V)], dst: &mut [Record<K, V>], hasher: &H)
where
    K: Clone + Ord,
    V: Clone,
    H: Fn(&K) -> u64,
{
    sort_into_with(src, dst, hasher, &SortConfig::sequential(src.len()));
}

/// Sequential out-of-place sort with caller-chosen geometry.
pub fn sort_into_with<K, V, H>(
    src: &[(K, V)],
    dst: &mut [Record<K, V>],
    hasher: &H,
    config: &SortConfig,
) where
    K: Clone + Ord,
    V: Clone,
    H: Fn(&K) -> u64,
{
    check_contract(src.len(), dst.len(), config);

    if src.is_empty() {
        return;
    }

    if src.len() <= COMPARATIVE_CUTOFF {
        return comparative_sort(src, dst, hasher);
    }

    if mem::size_of::<Record<K, V>>() > 32 {
        depth_first_sort(src, dst, hasher, config);
    } else {
        breadth_first_sort(src, dst, hasher, config);
    }
}

/// Parallel out-of-place sort with automatic geometry and one worker per
/// hardware thread.
#[cfg(feature = "multi-threaded")]
pub fn par_sort_into<K, V, H>(src: &[(K, V)], dst: &mut [Record<K, V>], hasher: &H)
where
    K: Clone + Ord + Send + Sync,
    V: Clone + Send + Sync,
    H: Fn(&K) -> u64 + Sync,
{
    par_sort_into_with(
        src,
        dst,
        hasher,
        default_threads(),
        &SortConfig::parallel(src.len()),
    );
}

/// Parallel out-of-place sort with explicit worker count and geometry.
///
/// The parallel engines always partition the full 64-bit fingerprint and
/// refine every bit; only `partition_bits` is read from the config.
#[cfg(feature = "multi-threaded")]
pub fn par_sort_into_with<K, V, H>(
    src: &[(K, V)],
    dst: &mut [Record<K, V>],
    hasher: &H,
    threads: usize,
    config: &SortConfig,
) where
    K: Clone + Ord + Send + Sync,
    V: Clone + Send + Sync,
    H: Fn(&K) -> u64 + Sync,
{
    check_contract(src.len(), dst.len(), config);
    assert!(threads > 0, "at least one worker is required");

    if src.is_empty() {
        return;
    }

    if src.len() <= COMPARATIVE_CUTOFF {
        return comparative_sort(src, dst, hasher);
    }

    mt_sort(src, dst, hasher, threads, config.partition_bits);
}

/// Sequential in-place sort over caller-materialized records, automatic
/// geometry.
pub fn sort_in_place<K, V>(dst: &mut [Record<K, V>])
where
    K: Ord,
{
    sort_in_place_with(dst, &SortConfig::parallel(dst.len()));
}

/// Sequential in-place sort with caller-chosen geometry.
pub fn sort_in_place_with<K, V>(dst: &mut [Record<K, V>], config: &SortConfig)
where
    K: Ord,
{
    check_contract(dst.len(), dst.len(), config);

    if dst.len() <= COMPARATIVE_CUTOFF {
        return insertion_sort(dst);
    }

    inplace_sort(dst, config.partition_bits);
}

/// Parallel in-place sort with automatic geometry and one worker per
/// hardware thread.
#[cfg(feature = "multi-threaded")]
pub fn par_sort_in_place<K, V>(dst: &mut [Record<K, V>])
where
    K: Ord + Send + Sync,
    V: Send + Sync,
{
    let threads = default_threads();
    par_sort_in_place_with(dst, threads, &SortConfig::parallel(dst.len()));
}

/// Parallel in-place sort with explicit worker count and geometry. Only
/// `partition_bits` is read from the config (see [`par_sort_into_with`]).
#[cfg(feature = "multi-threaded")]
pub fn par_sort_in_place_with<K, V>(dst: &mut [Record<K, V>], threads: usize, config: &SortConfig)
where
    K: Ord + Send + Sync,
    V: Send + Sync,
{
    check_contract(dst.len(), dst.len(), config);
    assert!(threads > 0, "at least one worker is required");

    if dst.len() <= COMPARATIVE_CUTOFF {
        return insertion_sort(dst);
    }

    mt_inplace_sort(dst, threads, config.partition_bits);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::materialize;
    use crate::utils::test_utils::*;

    #[test]
    fn auto_geometry_sorts_integers() {
        // Keys below n: an identity fingerprint fits the sequential window.
        let pairs = bounded_pairs(30_000);
        let mut dst = zeroed_records(pairs.len());

        sort_into(&pairs, &mut dst, &|k| *k);

        assert_hash_key_sorted(&dst);
        assert_same_pairs(&pairs, &dst);
    }

    #[test]
    fn auto_geometry_groups_strings_by_masked_fingerprint() {
        // A full 64-bit hash overflows the auto window; the guarantee is
        // the masked grouping order, with ties keyed inside each leaf.
        let pairs = random_string_pairs(10_000);
        let mut dst = empty_string_records(pairs.len());
        let config = SortConfig::sequential(pairs.len());

        sort_into(&pairs, &mut dst, &string_hash);

        assert_masked_sorted(&dst, crate::geometry::low_mask(config.mask_bits));
        assert_same_pairs(&pairs, &dst);
    }

    #[test]
    fn tiny_inputs_take_the_comparative_path() {
        let pairs = random_pairs(100);
        let mut dst = zeroed_records(pairs.len());

        sort_into(&pairs, &mut dst, &|k| *k);

        assert_hash_key_sorted(&dst);
        assert_same_pairs(&pairs, &dst);
    }

    #[test]
    fn empty_input_leaves_output_untouched() {
        let mut dst = zeroed_records(4);
        sort_into::<u64, u64, _>(&[], &mut dst, &|k| *k);

        assert!(dst.iter().all(|r| r.hash == 0 && r.key == 0));
    }

    #[test]
    fn in_place_facade_round_trip() {
        let pairs = random_pairs(30_000);
        let mut recs = materialize(&pairs, |k| *k);

        sort_in_place(&mut recs);

        assert_hash_key_sorted(&recs);
        assert_same_pairs(&pairs, &recs);
    }

    #[test]
    #[should_panic(expected = "shorter than input")]
    fn short_output_panics() {
        let pairs = random_pairs(10);
        let mut dst = zeroed_records(5);

        sort_into(&pairs, &mut dst, &|k| *k);
    }

    #[test]
    #[should_panic(expected = "partition_bits")]
    fn out_of_range_partition_bits_panic() {
        let pairs = random_pairs(10);
        let mut dst = zeroed_records(10);
        let config = SortConfig {
            mask_bits: 64,
            partition_bits: 20,
            nosort_bits: 0,
        };

        sort_into_with(&pairs, &mut dst, &|k| *k, &config);
    }

    #[cfg(feature = "multi-threaded")]
    #[test]
    fn parallel_facades_agree_with_sequential() {
        let pairs = random_pairs(40_000);
        let config = SortConfig::parallel(pairs.len());

        // Sequential reference over the same full 64-bit window.
        let mut seq = zeroed_records(pairs.len());
        sort_into_with(&pairs, &mut seq, &|k| *k, &config);

        let mut par = zeroed_records(pairs.len());
        par_sort_into_with(&pairs, &mut par, &|k| *k, 4, &config);
        assert_eq!(par, seq);

        let mut inplace = materialize(&pairs, |k| *k);
        par_sort_in_place_with(&mut inplace, 4, &config);
        assert_eq!(inplace, seq);
    }
}
