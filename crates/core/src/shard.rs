//! Splitting the particle population into per-worker shards.

use std::ops::Range;

/// Splits `0..len` into `workers` contiguous, non-overlapping ranges.
///
/// The first `len % workers` shards are one element longer, so every index
/// is covered exactly once. Empty ranges are omitted; `workers == 0` is
/// treated as a single worker.
pub fn shard_ranges(len: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    let base = len / workers;
    let extra = len % workers;
    let mut ranges = Vec::with_capacity(workers);
    let mut start = 0;
    for i in 0..workers {
        let size = base + usize::from(i < extra);
        if size == 0 {
            break;
        }
        ranges.push(start..start + size);
        start += size;
    }
    ranges
}

/// Splits `items` into mutable sub-slices following [`shard_ranges`].
pub fn shard_slices<T>(items: &mut [T], workers: usize) -> Vec<&mut [T]> {
    let mut rest = items;
    let mut shards = Vec::new();
    for range in shard_ranges(rest.len(), workers) {
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(range.len());
        shards.push(head);
        rest = tail;
    }
    shards
}
