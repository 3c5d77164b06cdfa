//! Bounded worker pool for one bulk-synchronous round.
//!
//! Unlike a long-lived thread pool, [`scoped_parallel`] spins up exactly as
//! many OS threads as the round needs (bounded by the configured worker
//! count), runs one closure per item, and joins them all before returning —
//! matching the round scheduler's barrier-at-round-end model. Idle workers
//! steal from an [`Injector`] shared across the round so a slow task doesn't
//! starve threads that finished early.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crossbeam_deque::{Injector, Steal};

/// Runs `f` once per item in `items`, across up to `num_workers` OS threads,
/// returning outputs in the same order as `items`. Blocks until every item
/// has been processed.
///
/// `F` must be `Sync` since multiple worker threads call it concurrently
/// (each on a disjoint item); `T` and `R` must be `Send` to cross thread
/// boundaries.
pub fn scoped_parallel<T, R, F>(items: Vec<T>, num_workers: usize, f: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync,
{
    let num_items = items.len();
    if num_items == 0 {
        return Vec::new();
    }
    let num_workers = num_workers.max(1).min(num_items);

    let injector: Injector<(usize, T)> = Injector::new();
    for (idx, item) in items.into_iter().enumerate() {
        injector.push((idx, item));
    }

    let results: Vec<Mutex<Option<R>>> = (0..num_items).map(|_| Mutex::new(None)).collect();
    let remaining = AtomicUsize::new(num_items);

    std::thread::scope(|scope| {
        for _ in 0..num_workers {
            let injector = &injector;
            let results = &results;
            let remaining = &remaining;
            let f = &f;
            scope.spawn(move || loop {
                if remaining.load(Ordering::Acquire) == 0 {
                    break;
                }
                match injector.steal() {
                    Steal::Success((idx, item)) => {
                        let output = f(item);
                        *results[idx].lock().unwrap_or_else(std::sync::PoisonError::into_inner) =
                            Some(output);
                        remaining.fetch_sub(1, Ordering::AcqRel);
                    }
                    Steal::Empty => {
                        if remaining.load(Ordering::Acquire) == 0 {
                            break;
                        }
                        std::thread::yield_now();
                    }
                    Steal::Retry => continue,
                }
            });
        }
    });

    results
        .into_iter()
        .map(|cell| {
            cell.into_inner()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .expect("every injected item is processed exactly once before scoped_parallel returns")
        })
        .collect()
}
