//! Race harness for first-access contention.
//!
//! [`race`] lines `n` threads up on a barrier and releases them into one
//! call each, which is the worst case for a lazy slot.  The returned
//! [`RaceReport`] says how many distinct instances came back.

use std::collections::HashSet;
use std::sync::Barrier;
use std::time::Duration;

use lsr_core::{Handle, Result};
use rand::Rng;

use crate::registry::LazySingletonRegistry;

/// Outcome of one race.
#[derive(Debug)]
pub struct RaceReport<R> {
    handles: Vec<Handle<R>>,
    errors: usize,
}

impl<R> RaceReport<R> {
    /// Handles returned by successful calls, in thread order.
    pub fn handles(&self) -> &[Handle<R>] {
        &self.handles
    }

    /// Calls that returned an error.
    pub fn errors(&self) -> usize {
        self.errors
    }

    /// Number of distinct allocations among the returned handles.
    pub fn distinct_instances(&self) -> usize {
        self.handles
            .iter()
            .map(Handle::address)
            .collect::<HashSet<_>>()
            .len()
    }

    /// `true` if every call succeeded with the same instance.
    pub fn all_same_instance(&self) -> bool {
        self.errors == 0 && self.distinct_instances() <= 1
    }
}

/// Release `threads` callers of `get` at once and collect what they saw.
pub fn race<R, F>(threads: usize, get: F) -> RaceReport<R>
where
    R: Send + Sync,
    F: Fn() -> Result<Handle<R>> + Sync,
{
    race_with_jitter(threads, Duration::ZERO, get)
}

/// Like [`race`], but each thread sleeps a random time in `[0, max_jitter]`
/// after the barrier, to vary the interleaving between runs.
pub fn race_with_jitter<R, F>(threads: usize, max_jitter: Duration, get: F) -> RaceReport<R>
where
    R: Send + Sync,
    F: Fn() -> Result<Handle<R>> + Sync,
{
    let barrier = Barrier::new(threads);
    let max_micros = u64::try_from(max_jitter.as_micros()).unwrap_or(u64::MAX);

    let outcomes: Vec<Result<Handle<R>>> = std::thread::scope(|s| {
        let joins: Vec<_> = (0..threads)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    if max_micros > 0 {
                        let pause = rand::thread_rng().gen_range(0..=max_micros);
                        std::thread::sleep(Duration::from_micros(pause));
                    }
                    get()
                })
            })
            .collect();
        joins
            .into_iter()
            .map(|j| j.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    });

    let mut report = RaceReport {
        handles: Vec::with_capacity(threads),
        errors: 0,
    };
    for outcome in outcomes {
        match outcome {
            Ok(handle) => report.handles.push(handle),
            Err(_) => report.errors += 1,
        }
    }
    report
}

/// Race fresh registries until one hands out two instances or constructs
/// twice.
///
/// Returns the 1-based round where that happened, or `None` if all
/// `rounds` behaved.  Only the unsynchronized strategy should ever return
/// `Some`.
pub fn race_until_split<R, M>(rounds: usize, threads: usize, mut make: M) -> Option<usize>
where
    R: Send + Sync + 'static,
    M: FnMut() -> LazySingletonRegistry<R>,
{
    (1..=rounds).find(|_| {
        let registry = make();
        let report = race(threads, || registry.get_instance());
        report.distinct_instances() > 1 || registry.constructions() > 1
    })
}
