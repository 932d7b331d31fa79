//! Unsynchronized check-then-act.  **Do not use.**
//!
//! `get_instance` looks at the slot, and if it is empty, runs the
//! constructor and stores the result.  Nothing stops two threads from both
//! seeing the slot empty: each constructs its own resource, the later store
//! overwrites the earlier one, and the two callers walk away holding
//! different instances.
//!
//! The slot is still a `Mutex<Option<Arc<R>>>`, so there is no data race in
//! the memory-model sense.  The lock is simply released between the check
//! and the store, which is the whole bug.

use std::sync::{Arc, Mutex};

use log::{debug, warn};
use lsr_core::{Handle, Result, SlotState, StateCell, StrategyKind};

use crate::strategy::{lock_unpoisoned, InitFn, SingletonStrategy};

/// Lazy slot with no guard around construction.
pub struct NaiveLazy<R> {
    slot: Mutex<Option<Arc<R>>>,
    state: StateCell,
    init: InitFn<R>,
}

impl<R> NaiveLazy<R> {
    /// Create an empty slot.
    pub fn new(init: impl Fn() -> Result<R> + Send + Sync + 'static) -> Self {
        Self {
            slot: Mutex::new(None),
            state: StateCell::new(),
            init: Box::new(init),
        }
    }

    fn peek(&self) -> Option<Arc<R>> {
        lock_unpoisoned(&self.slot).clone()
    }
}

impl<R: Send + Sync> SingletonStrategy<R> for NaiveLazy<R> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::NaiveLazy
    }

    fn get_instance(&self) -> Result<Handle<R>> {
        // check
        if let Some(existing) = self.peek() {
            return Ok(Handle::from_arc(existing));
        }

        // act; another thread may be doing the same thing right now
        let claim = self.state.begin();
        match &claim {
            Ok(_) => debug!("naive: constructing"),
            Err(observed) => debug!("naive: constructing while slot is {observed}"),
        }
        let value = Arc::new(
            (self.init)().inspect_err(|e| warn!("naive: construction failed: {e}"))?,
        );

        let previous = lock_unpoisoned(&self.slot).replace(Arc::clone(&value));
        if previous.is_some() {
            warn!("naive: overwrote an instance another caller already holds");
        }
        match claim {
            Ok(guard) => guard.commit(),
            Err(_) => self.state.mark_ready(),
        }
        debug!("naive: constructed");
        Ok(Handle::from_arc(value))
    }

    fn get(&self) -> Option<Handle<R>> {
        self.peek().map(Handle::from_arc)
    }

    fn state(&self) -> SlotState {
        if lock_unpoisoned(&self.slot).is_some() {
            SlotState::Ready
        } else {
            self.state.load()
        }
    }

    fn constructions(&self) -> u64 {
        self.state.constructions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsr_core::Error;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn sequential_access_constructs_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let slot = NaiveLazy::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok("mongo")
        });
        assert_eq!(slot.state(), SlotState::Empty);
        assert!(slot.get().is_none());

        let a = slot.get_instance().unwrap();
        let b = slot.get_instance().unwrap();
        assert!(a.same_instance(&b));
        assert_eq!(*a, "mongo");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(slot.constructions(), 1);
        assert!(slot.is_ready());
    }

    #[test]
    fn failure_leaves_slot_empty() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let slot = NaiveLazy::new(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(Error::construction("mongo", "refused"))
            } else {
                Ok(1_u8)
            }
        });
        assert!(slot.get_instance().is_err());
        assert_eq!(slot.state(), SlotState::Empty);
        assert_eq!(*slot.get_instance().unwrap(), 1);
        assert_eq!(slot.constructions(), 1);
    }
}
