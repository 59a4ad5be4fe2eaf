use std::cmp::Ordering;

/// A materialized record: the 64-bit fingerprint of the key alongside the
/// original key/value pair.
///
/// The engine orders records by fingerprint and never inspects the key
/// except through the injected hash function and, on fingerprint collision,
/// the key's own `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<K, V> {
    pub hash: u64,
    pub key: K,
    pub value: V,
}

impl<K, V> Record<K, V> {
    #[inline]
    pub fn new(hash: u64, key: K, value: V) -> Self {
        Self { hash, key, value }
    }
}

impl<K: Ord, V> Record<K, V> {
    /// Tie-break comparator: fingerprint first, key on collision. Values
    /// never participate in the order.
    #[inline]
    pub fn cmp_hash_key(&self, other: &Self) -> Ordering {
        self.hash
            .cmp(&other.hash)
            .then_with(|| self.key.cmp(&other.key))
    }
}

/// Materialize `(key, value)` pairs into records, hashing each key once.
///
/// The in-place entry points operate on a buffer the caller has already
/// materialized; this is the helper that builds one.
pub fn materialize<K, V, H>(src: &[(K, V)], hasher: H) -> Vec<Record<K, V>>
where
    K: Clone,
    V: Clone,
    H: Fn(&K) -> u64,
{
    src.iter()
        .map(|(k, v)| Record::new(hasher(k), k.clone(), v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cmp_orders_by_hash_then_key() {
        let a = Record::new(1u64, 5u64, ());
        let b = Record::new(2u64, 1u64, ());
        let c = Record::new(2u64, 2u64, ());

        assert_eq!(a.cmp_hash_key(&b), Ordering::Less);
        assert_eq!(b.cmp_hash_key(&c), Ordering::Less);
        assert_eq!(c.cmp_hash_key(&c), Ordering::Equal);
    }

    #[test]
    fn materialize_applies_hasher() {
        let src = vec![(3u64, 30u64), (1, 10)];
        let recs = materialize(&src, |k| k * 2);

        assert_eq!(recs[0], Record::new(6, 3, 30));
        assert_eq!(recs[1], Record::new(2, 1, 10));
    }
}
