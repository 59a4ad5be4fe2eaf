use crate::record::Record;
use block_pseudorand::block_rand;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Random full-range `u64` keys with distinct index values. Suitable for
/// the 64-bit-window engines (in-place, parallel).
pub fn random_pairs(n: usize) -> Vec<(u64, u64)> {
    let keys: Vec<u64> = block_rand(n);

    keys.into_iter()
        .enumerate()
        .map(|(i, k)| (k, i as u64))
        .collect()
}

/// Random keys bounded below `n`, so an identity fingerprint fits the
/// `⌈log₂ n⌉` window the sequential geometry uses.
pub fn bounded_pairs(n: usize) -> Vec<(u64, u64)> {
    random_pairs(n)
        .into_iter()
        .map(|(k, v)| (k % n as u64, v))
        .collect()
}

pub fn random_string_pairs(n: usize) -> Vec<(String, u64)> {
    let keys: Vec<u64> = block_rand(n);

    keys.into_par_iter()
        .enumerate()
        .map(|(i, k)| (format!("key-{:016x}", k), i as u64))
        .collect()
}

/// Deterministic 64-bit string fingerprint (fixed-key SipHash).
pub fn string_hash(key: &String) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    key.hash(&mut hasher);

    hasher.finish()
}

pub fn zeroed_records(n: usize) -> Vec<Record<u64, u64>> {
    vec![Record::new(0, 0, 0); n]
}

pub fn empty_string_records(n: usize) -> Vec<Record<String, u64>> {
    (0..n).map(|_| Record::new(0, String::new(), 0)).collect()
}

/// Strong invariant: non-decreasing by `(fingerprint, key)`.
pub fn assert_hash_key_sorted<K: Ord + std::fmt::Debug, V>(records: &[Record<K, V>]) {
    for w in records.windows(2) {
        assert_ne!(
            w[0].cmp_hash_key(&w[1]),
            Ordering::Greater,
            "records out of order: ({:#x}, {:?}) > ({:#x}, {:?})",
            w[0].hash,
            w[0].key,
            w[1].hash,
            w[1].key
        );
    }
}

/// Weak invariant: non-decreasing by the masked fingerprint bits.
pub fn assert_masked_sorted<K, V>(records: &[Record<K, V>], mask: u64) {
    for w in records.windows(2) {
        assert!(
            w[0].hash & mask <= w[1].hash & mask,
            "masked fingerprints out of order: {:#x} > {:#x} (mask {:#x})",
            w[0].hash,
            w[1].hash,
            mask
        );
    }
}

/// Multiset invariant: the output holds exactly the input's `(k, v)`
/// pairs, no more, no fewer.
pub fn assert_same_pairs<K, V>(pairs: &[(K, V)], records: &[Record<K, V>])
where
    K: Ord + Clone + std::fmt::Debug,
    V: Ord + Clone + std::fmt::Debug,
{
    let mut expected: Vec<(K, V)> = pairs.to_vec();
    let mut actual: Vec<(K, V)> = records
        .iter()
        .map(|r| (r.key.clone(), r.value.clone()))
        .collect();

    expected.sort_unstable();
    actual.sort_unstable();

    assert_eq!(expected, actual);
}

/// `(k, v)` pairs used by the kernel unit tests: key doubles as value.
pub fn identity_pairs(keys: &[u64]) -> Vec<(u64, u64)> {
    keys.iter().map(|k| (*k, *k)).collect()
}
