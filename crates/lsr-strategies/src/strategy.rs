//! The singleton contract shared by every strategy.

use std::sync::{Mutex, MutexGuard, PoisonError};

use lsr_core::{Handle, Result, SlotState, StrategyKind};

/// Boxed resource constructor.
///
/// A constructor may run more than once: after a failed attempt the next
/// caller retries, and the unsynchronized strategy may run it concurrently.
pub type InitFn<R> = Box<dyn Fn() -> Result<R> + Send + Sync>;

/// A slot that owns at most one `R` and hands out shared handles to it.
///
/// # Contract
/// - Every successful [`get_instance`](Self::get_instance) returns a handle
///   to the same allocation ([`Handle::same_instance`]).
/// - The resource is constructed at most once for the lifetime of the slot.
/// - A failed construction leaves the slot [`SlotState::Empty`].
/// - Once [`SlotState::Ready`], calls perform no construction work.
///
/// Only [`NaiveLazy`](crate::naive::NaiveLazy) breaks the first two points
/// under concurrent first access; it exists to show why the others lock.
pub trait SingletonStrategy<R>: Send + Sync {
    /// Which strategy this is.
    fn kind(&self) -> StrategyKind;

    /// Return the shared instance, constructing it on first access.
    fn get_instance(&self) -> Result<Handle<R>>;

    /// Return the instance if it is already published, without constructing.
    fn get(&self) -> Option<Handle<R>>;

    /// Current slot state.
    fn state(&self) -> SlotState;

    /// Number of successful constructions this slot has performed.
    fn constructions(&self) -> u64;

    /// `true` once the instance is published.
    fn is_ready(&self) -> bool {
        self.state() == SlotState::Ready
    }
}

/// Lock `mutex`, ignoring poisoning.
///
/// Slot mutexes only guard data that is written after a successful
/// construction, so a panic while the lock was held never leaves a
/// half-written value behind.
pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
