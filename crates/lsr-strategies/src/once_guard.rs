//! One-time initialization guard.
//!
//! Construction is delegated to [`once_cell::sync::OnceCell`], which runs
//! the initializer on at most one thread at a time, blocks the others until
//! it finishes, and owns the memory ordering of publication.  A failed (or
//! panicking) initializer leaves the cell empty, so the next caller retries.
//!
//! This is the strategy to reach for; the hand-written
//! [`DoubleChecked`](crate::double_checked::DoubleChecked) exists to show
//! what it does under the hood.

use std::sync::Arc;

use log::{debug, trace, warn};
use lsr_core::{ConstructionGuard, Error, Handle, Result, SlotState, StateCell, StrategyKind};
use once_cell::sync::OnceCell;

use crate::strategy::{InitFn, SingletonStrategy};

/// Lazy slot backed by a `OnceCell`.
pub struct OnceGuard<R> {
    cell: OnceCell<Arc<R>>,
    state: StateCell,
    init: InitFn<R>,
}

impl<R> OnceGuard<R> {
    /// Create an empty slot.
    pub fn new(init: impl Fn() -> Result<R> + Send + Sync + 'static) -> Self {
        Self {
            cell: OnceCell::new(),
            state: StateCell::new(),
            init: Box::new(init),
        }
    }
}

impl<R: Send + Sync> SingletonStrategy<R> for OnceGuard<R> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::OnceGuard
    }

    fn get_instance(&self) -> Result<Handle<R>> {
        if let Some(existing) = self.cell.get() {
            trace!("once-guard: fast path");
            return Ok(Handle::from_arc(Arc::clone(existing)));
        }

        let mut claimed: Option<ConstructionGuard<'_>> = None;
        let value = self.cell.get_or_try_init(|| {
            let guard = self.state.begin().map_err(|observed| {
                Error::Runtime(format!("once-guard slot is {observed} inside its initializer"))
            })?;
            debug!("once-guard: constructing");
            let value =
                (self.init)().inspect_err(|e| warn!("once-guard: construction failed: {e}"))?;
            claimed = Some(guard);
            Ok::<_, Error>(Arc::new(value))
        })?;
        if let Some(guard) = claimed {
            guard.commit();
            debug!("once-guard: constructed");
        }
        Ok(Handle::from_arc(Arc::clone(value)))
    }

    fn get(&self) -> Option<Handle<R>> {
        self.cell.get().map(|v| Handle::from_arc(Arc::clone(v)))
    }

    fn state(&self) -> SlotState {
        if self.cell.get().is_some() {
            SlotState::Ready
        } else {
            self.state.load()
        }
    }

    fn constructions(&self) -> u64 {
        self.state.constructions()
    }
}
