//! Instrumented constructors for exercising strategies.
//!
//! [`CountingInitializer`] wraps a constructor and records every attempt and
//! every success in a shared [`ConstructionCounter`].  It can also sleep
//! inside construction to widen race windows, and fail or panic on its
//! first few attempts to exercise retry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::warn;
use lsr_core::{Error, Result};

/// Shared attempt/success counters.
#[derive(Debug, Clone, Default)]
pub struct ConstructionCounter {
    attempts: Arc<AtomicU64>,
    successes: Arc<AtomicU64>,
}

impl ConstructionCounter {
    /// Times the constructor was entered.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Times the constructor returned a value.
    pub fn successes(&self) -> u64 {
        self.successes.load(Ordering::SeqCst)
    }
}

/// A constructor that counts its invocations.
pub struct CountingInitializer<R> {
    label: String,
    make: Box<dyn Fn() -> Result<R> + Send + Sync>,
    counter: ConstructionCounter,
    delay: Duration,
    failures_left: AtomicU64,
    panics_left: AtomicU64,
}

impl<R> CountingInitializer<R> {
    /// Count an infallible constructor.
    pub fn new(label: impl Into<String>, make: impl Fn() -> R + Send + Sync + 'static) -> Self {
        Self::fallible(label, move || Ok(make()))
    }

    /// Count a fallible constructor.
    pub fn fallible(
        label: impl Into<String>,
        make: impl Fn() -> Result<R> + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            make: Box::new(make),
            counter: ConstructionCounter::default(),
            delay: Duration::ZERO,
            failures_left: AtomicU64::new(0),
            panics_left: AtomicU64::new(0),
        }
    }

    /// Sleep for `delay` inside every construction attempt.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Report a construction error on the first `n` attempts.
    pub fn fail_first(self, n: u64) -> Self {
        self.failures_left.store(n, Ordering::SeqCst);
        self
    }

    /// Panic on the first `n` attempts (checked after scripted failures).
    pub fn panic_first(self, n: u64) -> Self {
        self.panics_left.store(n, Ordering::SeqCst);
        self
    }

    /// A handle to the counters that stays valid after `self` is moved.
    pub fn counter(&self) -> ConstructionCounter {
        self.counter.clone()
    }

    /// Run one construction attempt.
    pub fn construct(&self) -> Result<R> {
        self.counter.attempts.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if take_one(&self.failures_left) {
            warn!("counting initializer: scripted failure for `{}`", self.label);
            return Err(Error::construction(&self.label, "scripted failure"));
        }
        if take_one(&self.panics_left) {
            panic!("counting initializer: scripted panic for `{}`", self.label);
        }
        let value = (self.make)()?;
        self.counter.successes.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }

    /// Move into a closure usable as a strategy constructor.
    pub fn into_fn(self) -> impl Fn() -> Result<R> + Send + Sync + 'static
    where
        R: 'static,
    {
        move || self.construct()
    }
}

fn take_one(budget: &AtomicU64) -> bool {
    budget
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_attempts_and_successes() {
        let init = CountingInitializer::new("primary", || 5_u8).fail_first(2);
        let counter = init.counter();
        assert!(init.construct().is_err());
        assert!(init.construct().is_err());
        assert_eq!(init.construct().unwrap(), 5);
        assert_eq!(counter.attempts(), 3);
        assert_eq!(counter.successes(), 1);
    }

    #[test]
    fn scripted_panic() {
        let init = CountingInitializer::new("primary", || 0_u8).panic_first(1);
        let first = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| init.construct()));
        assert!(first.is_err());
        assert!(init.construct().is_ok());
    }
}
