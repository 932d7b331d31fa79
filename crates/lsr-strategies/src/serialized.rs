//! Fully serialized lazy initialization.
//!
//! The whole accessor runs under one mutex.  Correct, but every read after
//! construction still queues on the lock for the life of the process.

use std::sync::{Arc, Mutex};

use log::{debug, trace, warn};
use lsr_core::{Error, Handle, Result, SlotState, StateCell, StrategyKind};

use crate::strategy::{lock_unpoisoned, InitFn, SingletonStrategy};

/// Lazy slot guarded end to end by a `Mutex`.
pub struct Serialized<R> {
    slot: Mutex<Option<Arc<R>>>,
    state: StateCell,
    init: InitFn<R>,
}

impl<R> Serialized<R> {
    /// Create an empty slot.
    pub fn new(init: impl Fn() -> Result<R> + Send + Sync + 'static) -> Self {
        Self {
            slot: Mutex::new(None),
            state: StateCell::new(),
            init: Box::new(init),
        }
    }
}

impl<R: Send + Sync> SingletonStrategy<R> for Serialized<R> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Serialized
    }

    fn get_instance(&self) -> Result<Handle<R>> {
        let mut slot = lock_unpoisoned(&self.slot);
        if let Some(existing) = slot.as_ref() {
            trace!("serialized: already constructed");
            return Ok(Handle::from_arc(Arc::clone(existing)));
        }

        let guard = self.state.begin().map_err(|observed| {
            Error::Runtime(format!("serialized slot is {observed} while the lock is held"))
        })?;
        debug!("serialized: constructing under lock");
        let value = Arc::new(
            (self.init)().inspect_err(|e| warn!("serialized: construction failed: {e}"))?,
        );
        *slot = Some(Arc::clone(&value));
        guard.commit();
        debug!("serialized: constructed");
        Ok(Handle::from_arc(value))
    }

    fn get(&self) -> Option<Handle<R>> {
        lock_unpoisoned(&self.slot).clone().map(Handle::from_arc)
    }

    fn state(&self) -> SlotState {
        self.state.load()
    }

    fn constructions(&self) -> u64 {
        self.state.constructions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn constructs_once_and_shares() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let slot = Serialized::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(vec![1, 2, 3])
        });
        let handles: Vec<_> = (0..5).map(|_| slot.get_instance().unwrap()).collect();
        assert!(handles.iter().all(|h| h.same_instance(&handles[0])));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(slot.constructions(), 1);
    }

    #[test]
    fn panic_does_not_poison() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let slot = Serialized::new(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("first connect attempt panicked");
            }
            Ok(42_u64)
        });
        let first = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| slot.get_instance()));
        assert!(first.is_err());
        assert_eq!(slot.state(), SlotState::Empty);

        assert_eq!(*slot.get_instance().unwrap(), 42);
        assert_eq!(slot.state(), SlotState::Ready);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
