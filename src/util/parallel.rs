//! Static partitioning of independent work units over a bounded set of
//! workers.
//!
//! The units `0..n` are cut up front into contiguous ranges, one per worker,
//! the last range taking the remainder. Every worker owns its range and the
//! results come back in range order once all of them have finished.

use std::ops::Range;

use rayon::prelude::*;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPool {
    num_workers: usize,
}

impl WorkerPool {
    /// one worker per thread of rayon's pool
    pub fn available() -> WorkerPool {
        WorkerPool::with_workers(rayon::current_num_threads())
    }

    pub fn with_workers(num_workers: usize) -> WorkerPool {
        assert!(num_workers > 0, "a pool needs at least one worker");
        WorkerPool { num_workers }
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Contiguous, disjoint ranges covering `0..num_units`, at most one per
    /// worker and never more than `num_units`.
    pub fn partition(&self, num_units: usize) -> Vec<Range<usize>> {
        let n = self.num_workers.min(num_units);
        if n == 0 {
            return Vec::new();
        }
        let chunk = num_units / n;
        (0..n)
            .map(|t| {
                let lo = t * chunk;
                let hi = if t == n - 1 { num_units } else { lo + chunk };
                lo..hi
            })
            .collect()
    }

    /// Runs `f` once per range of `partition(num_units)` and returns the
    /// results in range order.
    pub fn run<T, F>(&self, num_units: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize, Range<usize>) -> T + Sync,
    {
        let ranges = self.partition(num_units);
        info!(workers = ranges.len(), units = num_units, "number of workers used");
        ranges
            .into_par_iter()
            .enumerate()
            .map(|(worker, range)| f(worker, range))
            .collect()
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        WorkerPool::available()
    }
}

#[test]
fn test_partition() {
    let pool = WorkerPool::with_workers(3);
    assert_eq!(pool.partition(10), vec![0..3, 3..6, 6..10]);
    assert_eq!(pool.partition(2), vec![0..1, 1..2]);
    assert!(pool.partition(0).is_empty());
}

#[test]
fn test_run_keeps_order() {
    let pool = WorkerPool::with_workers(4);
    let sums: Vec<usize> = pool.run(10, |_, r| r.sum());
    assert_eq!(sums.iter().sum::<usize>(), 45);
    assert_eq!(sums[0], 1);
}
