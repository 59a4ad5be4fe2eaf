use std::mem::MaybeUninit;

/// Exclusive prefix sums of the per-partition counts.
#[inline]
pub fn get_prefix_sums(counts: &[usize]) -> Vec<usize> {
    let mut sums = Vec::with_capacity(counts.len());

    let mut running_total = 0;
    for c in counts.iter() {
        sums.push(running_total);
        running_total += c;
    }

    sums
}

/// One-past-the-end offset of each partition.
#[inline]
pub fn get_end_offsets(counts: &[usize], prefix_sums: &[usize]) -> Vec<usize> {
    counts
        .iter()
        .zip(prefix_sums.iter())
        .map(|(c, s)| c + s)
        .collect()
}

#[inline]
pub const fn cdiv(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}

/// An uninitialized scratch buffer of `len` slots.
///
/// Counting-sort scatter writes every slot exactly once, so the buffer is
/// never read before it is filled; `MaybeUninit` makes that contract
/// explicit instead of handing out garbage values.
#[inline]
pub fn uninit_scratch<T>(len: usize) -> Vec<MaybeUninit<T>> {
    let mut scratch = Vec::with_capacity(len);
    scratch.resize_with(len, MaybeUninit::uninit);

    scratch
}

/// Assume a scatter-filled scratch buffer is fully initialized and take
/// ownership of its records.
///
/// Safety: every slot must have been written since `uninit_scratch`
/// returned the buffer. The counting kernels guarantee this because the
/// partition counts sum to the buffer length.
#[inline]
pub unsafe fn assume_filled<T>(scratch: Vec<MaybeUninit<T>>) -> Vec<T> {
    let mut scratch = std::mem::ManuallyDrop::new(scratch);
    let (ptr, len, cap) = (scratch.as_mut_ptr(), scratch.len(), scratch.capacity());

    Vec::from_raw_parts(ptr as *mut T, len, cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_sums_are_exclusive() {
        let counts = vec![3, 0, 2, 5];
        let sums = get_prefix_sums(&counts);

        assert_eq!(sums, vec![0, 3, 3, 5]);
        assert_eq!(get_end_offsets(&counts, &sums), vec![3, 3, 5, 10]);
    }

    #[test]
    fn cdiv_rounds_up() {
        assert_eq!(cdiv(10, 4), 3);
        assert_eq!(cdiv(8, 4), 2);
        assert_eq!(cdiv(1, 100), 1);
    }

    #[test]
    fn scatter_fill_round_trip() {
        let mut scratch = uninit_scratch::<String>(3);
        for (i, slot) in scratch.iter_mut().enumerate() {
            slot.write(i.to_string());
        }

        let filled = unsafe { assume_filled(scratch) };
        assert_eq!(filled, vec!["0", "1", "2"]);
    }
}
