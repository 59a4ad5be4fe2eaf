//! The breadth-first out-of-place engine.
//!
//! Every depth is one linear sweep over the whole buffer. The sweep
//! carries an anchor (the start index and prefix of the outer partition
//! currently being counted) and flushes each detected run: cursors are
//! derived from the anchor index and the run-local counters, and the run
//! is scattered into the alternate buffer. The final depth scatters into
//! the destination and repairs fingerprint ties on the fly.
//!
//! ## Characteristics
//!
//!  * out-of-place (two scratch buffers)
//!  * unstable below the `(fingerprint, key)` order
//!  * single-threaded
//!
//! ## Performance
//!
//! Streaming front-to-back is what hardware prefetchers want, so this
//! engine wins for small records (integer keys). For heavy records the
//! depth-first engine's smaller working set takes over.

use crate::geometry::{low_mask, SortConfig};
use crate::record::Record;
use crate::sorts::counting_sort::{materialize_scatter, materialize_unordered, single_pass_sort};
use crate::utils::*;
use std::cmp::Ordering;
use std::mem;

pub fn breadth_first_sort<K, V, H>(
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

    if n == 0 {
        return;
    }

    match config.num_passes() {
        0 => return materialize_unordered(src, dst, hasher),
        1 => return single_pass_sort(src, &mut dst[..n], hasher, config),
        _ => {}
    }

    let mut scratch = uninit_scratch(n);
    materialize_scatter(
        src,
        &mut scratch,
        hasher,
        config.pass_mask(0),
        config.pass_shift(0),
        config.pass_partitions(0),
    );

    // Safety: pass-0 counts sum to n; every slot was written.
    let mut front = unsafe { assume_filled(scratch) };
    let mut back: Vec<Record<K, V>> = Vec::new();

    let last = config.num_passes() - 1;
    for depth in 1..=last {
        #[cfg(feature = "work_profiles")]
        println!("({}) BF", depth);

        if depth == last {
            refine_into_dst(&front, &mut dst[..n], config, depth);
        } else {
            if back.len() != n {
                back = front.clone();
            }
            refine_pass(&front, &mut back, config, depth);
            mem::swap(&mut front, &mut back);
        }
    }
}

/// One intermediate sweep: split every depth-`depth` run of `src_buf`
/// into its sub-partitions inside `target`.
fn refine_pass<K, V>(
    src_buf: &[Record<K, V>],
    target: &mut [Record<K, V>],
    config: &SortConfig,
    depth: u32,
) where
    K: Clone,
    V: Clone,
{
    let full_mask = low_mask(config.mask_bits);
    let prev_shift = config.pass_shift(depth - 1);
    let mask = config.pass_mask(depth);
    let shift = config.pass_shift(depth);
    let partitions = config.pass_partitions(depth);

    let mut counters = vec![0usize; partitions];
    let mut cursors = vec![0usize; partitions];

    let mut anchor = 0;
    let mut anchor_prefix = (src_buf[0].hash & full_mask) >> prev_shift;

    for j in 0..src_buf.len() {
        let h = src_buf[j].hash;
        let prefix = (h & full_mask) >> prev_shift;

        if prefix != anchor_prefix {
            flush(src_buf, target, &mut counters, &mut cursors, anchor, j, mask, shift);
            anchor = j;
            anchor_prefix = prefix;
        }

        counters[((h & mask) >> shift) as usize] += 1;
    }

    flush(
        src_buf,
        target,
        &mut counters,
        &mut cursors,
        anchor,
        src_buf.len(),
        mask,
        shift,
    );
}

/// Scatter one run into the alternate buffer. Cursors start at the anchor
/// index; counters are cleared as they are consumed so the next run starts
/// from zero.
#[allow(clippy::too_many_arguments)]
fn flush<K, V>(
    src_buf: &[Record<K, V>],
    target: &mut [Record<K, V>],
    counters: &mut [usize],
    cursors: &mut [usize],
    lo: usize,
    hi: usize,
    mask: u64,
    shift: u32,
) where
    K: Clone,
    V: Clone,
{
    let mut running_total = lo;
    for b in 0..counters.len() {
        cursors[b] = running_total;
        running_total += counters[b];
        counters[b] = 0;
    }
    debug_assert_eq!(running_total, hi);

    for r in &src_buf[lo..hi] {
        let b = ((r.hash & mask) >> shift) as usize;
        target[cursors[b]] = r.clone();
        cursors[b] += 1;
    }
}

/// The final sweep: scatter into the destination, bubbling each placed
/// record backward through its finest bucket while it compares below its
/// predecessor. This is the localized insertion sort that fixes
/// within-fingerprint order at a cost proportional to collision density.
fn refine_into_dst<K, V>(
    src_buf: &[Record<K, V>],
    dst: &mut [Record<K, V>],
    config: &SortConfig,
    depth: u32,
) where
    K: Clone + Ord,
    V: Clone,
{
    let full_mask = low_mask(config.mask_bits);
    let prev_shift = config.pass_shift(depth - 1);
    let mask = config.pass_mask(depth);
    let shift = config.pass_shift(depth);
    let partitions = config.pass_partitions(depth);
    let tie_break = config.nosort_bits == 0;

    let mut counters = vec![0usize; partitions];
    let mut cursors = vec![0usize; partitions];
    let mut starts = vec![0usize; partitions];

    let mut anchor = 0;
    let mut anchor_prefix = (src_buf[0].hash & full_mask) >> prev_shift;

    for j in 0..src_buf.len() {
        let h = src_buf[j].hash;
        let prefix = (h & full_mask) >> prev_shift;

        if prefix != anchor_prefix {
            flush_into_dst(
                src_buf,
                dst,
                &mut counters,
                &mut cursors,
                &mut starts,
                anchor,
                j,
                mask,
                shift,
                tie_break,
            );
            anchor = j;
            anchor_prefix = prefix;
        }

        counters[((h & mask) >> shift) as usize] += 1;
    }

    flush_into_dst(
        src_buf,
        dst,
        &mut counters,
        &mut cursors,
        &mut starts,
        anchor,
        src_buf.len(),
        mask,
        shift,
        tie_break,
    );
}

/// Scatter one run into its final position, repairing ties as records
/// land. `starts` pins each bucket's left edge so the bubble never crosses
/// into a lower bucket.
#[allow(clippy::too_many_arguments)]
fn flush_into_dst<K, V>(
    src_buf: &[Record<K, V>],
    dst: &mut [Record<K, V>],
    counters: &mut [usize],
    cursors: &mut [usize],
    starts: &mut [usize],
    lo: usize,
    hi: usize,
    mask: u64,
    shift: u32,
    tie_break: bool,
) where
    K: Clone + Ord,
    V: Clone,
{
    let mut running_total = lo;
    for b in 0..counters.len() {
        cursors[b] = running_total;
        starts[b] = running_total;
        running_total += counters[b];
        counters[b] = 0;
    }
    debug_assert_eq!(running_total, hi);

    for r in &src_buf[lo..hi] {
        let b = ((r.hash & mask) >> shift) as usize;
        let mut pos = cursors[b];
        dst[pos] = r.clone();
        cursors[b] += 1;

        if tie_break {
            while pos > starts[b] && dst[pos].cmp_hash_key(&dst[pos - 1]) == Ordering::Less {
                dst.swap(pos, pos - 1);
                pos -= 1;
            }
        }
    }
}
