//! The parallel in-place driver.
//!
//! Phase A counts the top-level partitions per worker chunk; the barrier
//! leader turns the matrix into global partition bounds and seeds one
//! locked cursor per partition. Phase B is the cyclic shift under those
//! locks: a worker empties the partition it is parked on by lifting one
//! out-of-place record at a time and chasing it through the permutation,
//! holding only the lock of the partition it is currently touching.
//!
//! The hole discipline makes the lift sound: the slot is claimed by
//! advancing the partition cursor past it *before* the record is moved
//! out, so no other worker can observe or allocate the empty slot, and
//! the chain always terminates by writing its final record back into it.
//!
//! ## Characteristics
//!
//!  * in-place (`O(P·T)` counters + `O(P)` locks)
//!  * multi-threaded, fine-grained locking
//!  * unstable below the `(fingerprint, key)` order
//!
//! ## Performance
//!
//! The critical section is a single cursor bump plus swap, so per-
//! partition locks beat queue-based schemes. Workers start at staggered
//! partitions (`(t·17) mod P`) to keep them off each other's locks.

use crate::barrier::ThreadBarrier;
use crate::record::Record;
use crate::sorts::inplace_sort::inplace_refine;
use crate::utils::*;
use std::cmp::min;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;

pub fn mt_inplace_sort<K, V>(dst: &mut [Record<K, V>], threads: usize, partition_bits: u32)
where
    K: Ord + Send + Sync,
    V: Send + Sync,
{
    let n = dst.len();
    if n < 2 {
        return;
    }

    let threads = threads.max(1);
    let partitions = 1usize << partition_bits;
    let shift = 64 - partition_bits;
    let chunk_len = cdiv(n, threads);

    let counts: Vec<AtomicUsize> = (0..threads * partitions)
        .map(|_| AtomicUsize::new(0))
        .collect();
    let offsets: Vec<AtomicUsize> = (0..partitions + 1).map(|_| AtomicUsize::new(0)).collect();
    let firsts: Vec<Mutex<usize>> = (0..partitions).map(|_| Mutex::new(0)).collect();
    let ends: Vec<AtomicUsize> = (0..partitions).map(|_| AtomicUsize::new(0)).collect();
    let barrier = ThreadBarrier::new(threads);
    let next_range = AtomicUsize::new(0);
    let shared = SharedSlice::new(dst);

    let worker = |t: usize| {
        let lo = min(t * chunk_len, n);
        let hi = min(lo + chunk_len, n);

        // Phase A: private counts over this worker's chunk. Everyone is
        // read-only here; writers only exist after the next barrier.
        let mut local_counts = vec![0usize; partitions];
        for i in lo..hi {
            let h = unsafe { shared.get(i) }.hash;
            local_counts[(h >> shift) as usize] += 1;
        }

        for (b, c) in local_counts.iter().enumerate() {
            counts[t * partitions + b].store(*c, Ordering::Relaxed);
        }

        if barrier.wait() {
            let mut total = 0;
            for b in 0..partitions {
                offsets[b].store(total, Ordering::Relaxed);
                *firsts[b].lock().unwrap() = total;

                for w in 0..threads {
                    total += counts[w * partitions + b].load(Ordering::Relaxed);
                }

                ends[b].store(total, Ordering::Relaxed);
            }
            offsets[partitions].store(total, Ordering::Relaxed);
        }
        barrier.wait();

        // Phase B: locked cyclic shift, starting at a staggered partition.
        let start = (t * 17) % partitions;
        for p in 0..partitions {
            let home = (start + p) % partitions;
            empty_partition(&shared, &firsts, &ends, home, shift);
        }

        barrier.wait();

        // Refinement: independent partition ranges off a shared queue.
        loop {
            let i = next_range.fetch_add(1, Ordering::Relaxed);
            if i >= partitions {
                break;
            }

            let range_lo = offsets[i].load(Ordering::Relaxed);
            let range_hi = offsets[i + 1].load(Ordering::Relaxed);

            // Safety: ranges are disjoint and all scatter chains closed
            // before the barrier.
            let range = unsafe { shared.range_mut(range_lo, range_hi) };
            inplace_refine(range, shift, partition_bits);
        }
    };

    thread::scope(|s| {
        let worker = &worker;
        for t in 1..threads {
            s.spawn(move || worker(t));
        }
        worker(0);
    });
}

/// Drain partition `home` of records that belong elsewhere. Returns once
/// its cursor has met its end; at that point every slot below the cursor
/// holds (or is reserved for) a record of this partition.
fn empty_partition<K, V>(
    shared: &SharedSlice<Record<K, V>>,
    firsts: &[Mutex<usize>],
    ends: &[AtomicUsize],
    home: usize,
    shift: u32,
) {
    loop {
        let mut first = firsts[home].lock().unwrap();
        let end = ends[home].load(Ordering::Relaxed);

        // Skip records already where they belong. Slots at or above the
        // cursor are never holes, so the read is safe under this lock.
        while *first < end
            && (unsafe { shared.get(*first) }.hash >> shift) as usize == home
        {
            *first += 1;
        }

        if *first >= end {
            return;
        }

        let open = *first;
        *first += 1;

        // Safety: the cursor just moved past `open`; no other worker will
        // read or allocate it until the chain below refills it.
        let mut carried = unsafe { shared.read(open) };
        drop(first);

        loop {
            let target = (carried.hash >> shift) as usize;

            if target == home {
                // Safety: closes the hole reserved above.
                unsafe { shared.write(open, carried) };
                break;
            }

            let mut cursor = firsts[target].lock().unwrap();
            let target_end = ends[target].load(Ordering::Relaxed);

            while *cursor < target_end
                && (unsafe { shared.get(*cursor) }.hash >> shift) as usize == target
            {
                *cursor += 1;
            }

            // A carried record of this partition implies an unfinalized
            // slot remains.
            debug_assert!(*cursor < target_end);

            let slot = *cursor;
            *cursor += 1;

            // Safety: `slot` is covered by the lock held on `target`.
            unsafe { shared.swap_with(slot, &mut carried) };
            drop(cursor);
        }
    }
}
