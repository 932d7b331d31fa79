//! Eager initialization: construct when the slot is created.

use std::sync::Arc;

use log::{debug, warn};
use lsr_core::{Handle, Result, SlotState, StrategyKind};

use crate::strategy::SingletonStrategy;

/// A slot whose resource exists before the first `get_instance` call.
///
/// Always correct under concurrency, because there is nothing left to race
/// on.  The price is paying for construction even if nobody asks.
pub struct Eager<R> {
    instance: Arc<R>,
}

impl<R> Eager<R> {
    /// Run `init` now and hold the result.
    ///
    /// Construction failure is reported here rather than from
    /// `get_instance`.
    pub fn new(init: impl FnOnce() -> Result<R>) -> Result<Self> {
        let value = init().inspect_err(|e| warn!("eager: construction failed: {e}"))?;
        debug!("eager: constructed at slot creation");
        Ok(Self::from_value(value))
    }

    /// Wrap an already-constructed value.
    pub fn from_value(value: R) -> Self {
        Self {
            instance: Arc::new(value),
        }
    }
}

impl<R: Send + Sync> SingletonStrategy<R> for Eager<R> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Eager
    }

    fn get_instance(&self) -> Result<Handle<R>> {
        Ok(Handle::from_arc(Arc::clone(&self.instance)))
    }

    fn get(&self) -> Option<Handle<R>> {
        Some(Handle::from_arc(Arc::clone(&self.instance)))
    }

    fn state(&self) -> SlotState {
        SlotState::Ready
    }

    fn constructions(&self) -> u64 {
        1
    }
}
