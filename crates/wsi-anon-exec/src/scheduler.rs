//! Bounded, order-preserving fan-out for per-row work.
//!
//! Items run in consecutive waves of at most `max_parallel` scoped threads.
//! A wave is fully joined before its results reach the sink, and the sink
//! always sees results in input order. With `max_parallel <= 1` everything
//! runs on the calling thread.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;

/// Outcome of one work item; `Err` carries the panic payload.
pub type TaskResult<R> = thread::Result<R>;

pub fn for_each_ordered<T, R, E, F, S>(
    items: &[T],
    max_parallel: usize,
    work: F,
    mut sink: S,
) -> Result<(), E>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
    S: FnMut(&T, TaskResult<R>) -> Result<(), E>,
{
    if max_parallel <= 1 {
        for item in items {
            let result = catch_unwind(AssertUnwindSafe(|| work(item)));
            sink(item, result)?;
        }
        return Ok(());
    }

    for wave in items.chunks(max_parallel) {
        let results: Vec<TaskResult<R>> = thread::scope(|s| {
            let handles: Vec<_> = wave
                .iter()
                .map(|item| {
                    let work = &work;
                    s.spawn(move || work(item))
                })
                .collect();
            handles.into_iter().map(|h| h.join()).collect()
        });
        for (item, result) in wave.iter().zip(results) {
            sink(item, result)?;
        }
    }
    Ok(())
}
