//! Singleton slot state machine.
//!
//! A slot moves `Empty → Constructing → Ready`.  `Ready` is terminal.  A
//! construction that fails (or panics) rolls the slot back from
//! `Constructing` to `Empty` so the next caller can retry.
//!
//! Slots built on a primitive that cannot be re-run after a panic (a
//! `LazyLock`) ask their guard to abandon into `Poisoned` instead, which is
//! also terminal.
//!
//! [`StateCell`] stores the state in an `AtomicU8`.  It is bookkeeping that
//! every strategy keeps next to its storage: strategies publish the resource
//! through their own primitive and then mark the cell `Ready`.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Observable state of a singleton slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SlotState {
    /// No resource has been published yet.
    Empty = 0,
    /// A caller is running the constructor.
    Constructing = 1,
    /// The resource is published and will never change.
    Ready = 2,
    /// The one-shot initializer panicked; the slot can never become ready.
    Poisoned = 3,
}

impl SlotState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Empty,
            1 => Self::Constructing,
            2 => Self::Ready,
            _ => Self::Poisoned,
        }
    }
}

impl fmt::Display for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Empty => "empty",
            Self::Constructing => "constructing",
            Self::Ready => "ready",
            Self::Poisoned => "poisoned",
        };
        f.write_str(s)
    }
}

/// Atomic slot state plus a count of successful constructions.
#[derive(Debug)]
pub struct StateCell {
    state: AtomicU8,
    constructions: AtomicU64,
}

impl StateCell {
    /// A cell in the `Empty` state.
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(SlotState::Empty as u8),
            constructions: AtomicU64::new(0),
        }
    }

    /// A cell that is already `Ready` with one recorded construction.
    pub const fn ready() -> Self {
        Self {
            state: AtomicU8::new(SlotState::Ready as u8),
            constructions: AtomicU64::new(1),
        }
    }

    /// Current state (acquire load).
    pub fn load(&self) -> SlotState {
        SlotState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Number of constructions committed into this cell.
    ///
    /// For every correct strategy this is 0 or 1.
    pub fn constructions(&self) -> u64 {
        self.constructions.load(Ordering::Acquire)
    }

    /// Claim the `Empty → Constructing` transition.
    ///
    /// Returns the observed state if the slot was not `Empty`.  The returned
    /// guard rolls the slot back to `Empty` unless
    /// [`commit`](ConstructionGuard::commit) is called.
    pub fn begin(&self) -> Result<ConstructionGuard<'_>, SlotState> {
        self.state
            .compare_exchange(
                SlotState::Empty as u8,
                SlotState::Constructing as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ConstructionGuard {
                cell: self,
                committed: false,
                on_abandon: SlotState::Empty,
            })
            .map_err(SlotState::from_u8)
    }

    /// Record a construction and publish `Ready` (release store).
    ///
    /// Used directly only by strategies that do not hold a
    /// [`ConstructionGuard`], i.e. the unsynchronized one.
    pub fn mark_ready(&self) {
        self.constructions.fetch_add(1, Ordering::AcqRel);
        self.state.store(SlotState::Ready as u8, Ordering::Release);
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive claim on the `Constructing` state of a [`StateCell`].
#[must_use = "dropping the guard without commit rolls the slot back to Empty"]
#[derive(Debug)]
pub struct ConstructionGuard<'a> {
    cell: &'a StateCell,
    committed: bool,
    on_abandon: SlotState,
}

impl ConstructionGuard<'_> {
    /// Abandon into `Poisoned` rather than `Empty`.
    ///
    /// For initializers whose primitive refuses to run again after a panic.
    pub fn poison_on_abandon(mut self) -> Self {
        self.on_abandon = SlotState::Poisoned;
        self
    }

    /// Finish construction: `Constructing → Ready`.
    pub fn commit(mut self) {
        self.committed = true;
        self.cell.mark_ready();
    }
}

impl Drop for ConstructionGuard<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.cell
                .state
                .store(self.on_abandon as u8, Ordering::Release);
        }
    }
}
