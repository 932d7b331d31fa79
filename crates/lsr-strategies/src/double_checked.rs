//! Double-checked locking.
//!
//! Fast path: load the published handle without taking any lock.  Slow
//! path, only while the slot is empty: take the construction lock, check
//! again (another thread may have published while we waited), construct,
//! publish.
//!
//! The pattern is only correct if publication is ordered.  The handle lives
//! in an [`ArcSwapOption`]: `store` is a release operation and `load` an
//! acquire operation, so a reader that sees `Some` also sees every write
//! the constructing thread made to the resource before publishing it.
//! A plain flag plus a separately written pointer would not give that.

use std::sync::{Arc, Mutex};

use arc_swap::ArcSwapOption;
use log::{debug, trace, warn};
use lsr_core::{Error, Handle, Result, SlotState, StateCell, StrategyKind};

use crate::strategy::{lock_unpoisoned, InitFn, SingletonStrategy};

/// Lazy slot with a lock-free read path after publication.
pub struct DoubleChecked<R> {
    published: ArcSwapOption<R>,
    construction: Mutex<()>,
    state: StateCell,
    init: InitFn<R>,
}

impl<R> DoubleChecked<R> {
    /// Create an empty slot.
    pub fn new(init: impl Fn() -> Result<R> + Send + Sync + 'static) -> Self {
        Self {
            published: ArcSwapOption::empty(),
            construction: Mutex::new(()),
            state: StateCell::new(),
            init: Box::new(init),
        }
    }
}

impl<R: Send + Sync> SingletonStrategy<R> for DoubleChecked<R> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::DoubleChecked
    }

    fn get_instance(&self) -> Result<Handle<R>> {
        // first check, no lock
        if let Some(existing) = self.published.load_full() {
            trace!("double-checked: fast path");
            return Ok(Handle::from_arc(existing));
        }

        let _lock = lock_unpoisoned(&self.construction);

        // second check, under the lock
        if let Some(existing) = self.published.load_full() {
            return Ok(Handle::from_arc(existing));
        }

        let guard = self.state.begin().map_err(|observed| {
            Error::Runtime(format!(
                "double-checked slot is {observed} while the construction lock is held"
            ))
        })?;
        debug!("double-checked: constructing");
        let value = Arc::new(
            (self.init)().inspect_err(|e| warn!("double-checked: construction failed: {e}"))?,
        );
        self.published.store(Some(Arc::clone(&value)));
        guard.commit();
        debug!("double-checked: constructed");
        Ok(Handle::from_arc(value))
    }

    fn get(&self) -> Option<Handle<R>> {
        self.published.load_full().map(Handle::from_arc)
    }

    fn state(&self) -> SlotState {
        if self.published.load().is_some() {
            SlotState::Ready
        } else {
            self.state.load()
        }
    }

    fn constructions(&self) -> u64 {
        self.state.constructions()
    }
}
