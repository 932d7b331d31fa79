//! Enumerated-constant singletons.
//!
//! Each [`ConnectionConstant`] variant names one member of a fixed table of
//! connections.  The whole table is built exactly once, on first touch,
//! through a `static LazyLock`; after that every variant resolves to the
//! same allocation forever.  The set of members and their parameters are
//! fixed at compile time.

use std::fmt;
use std::sync::{Arc, LazyLock};

use log::debug;
use lsr_core::{Backend, Connection, Error, Handle, Result, SlotState, StateCell, StrategyKind};

use crate::strategy::SingletonStrategy;

static TABLE_STATE: StateCell = StateCell::new();

static TABLE: LazyLock<[Arc<Connection>; ConnectionConstant::COUNT]> = LazyLock::new(|| {
    let claim = TABLE_STATE.begin().map(|guard| guard.poison_on_abandon());
    debug!("constant: building connection table");
    let table = ConnectionConstant::ALL.map(|member| {
        Arc::new(Connection::open(member.label(), member.backend()))
    });
    if let Ok(guard) = claim {
        guard.commit();
    }
    table
});

/// The fixed set of process-wide connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionConstant {
    /// The primary SQL connection.
    Primary,
    /// The document-store connection.
    Documents,
}

impl ConnectionConstant {
    /// Number of members.
    pub const COUNT: usize = 2;

    /// Every member, in table order.
    pub const ALL: [ConnectionConstant; Self::COUNT] = [Self::Primary, Self::Documents];

    /// Label of the member's connection.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Documents => "documents",
        }
    }

    /// Backend of the member's connection.
    pub const fn backend(self) -> Backend {
        match self {
            Self::Primary => Backend::Sql,
            Self::Documents => Backend::Mongo,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }

    /// The member whose label and backend match, if any.
    pub fn lookup(label: &str, backend: Backend) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.label() == label && m.backend() == backend)
    }

    /// Shared handle to this member's connection.
    pub fn handle(self) -> Handle<Connection> {
        Handle::from_arc(Arc::clone(&TABLE[self.index()]))
    }

    /// Number of times the table has been built (0 or 1).
    pub fn table_builds() -> u64 {
        TABLE_STATE.constructions()
    }
}

impl fmt::Display for ConnectionConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Adapter exposing one [`ConnectionConstant`] member through the
/// [`SingletonStrategy`] contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantSlot {
    member: ConnectionConstant,
}

impl ConstantSlot {
    /// Slot for `member`.
    pub const fn new(member: ConnectionConstant) -> Self {
        Self { member }
    }
}

impl SingletonStrategy<Connection> for ConstantSlot {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Constant
    }

    fn get_instance(&self) -> Result<Handle<Connection>> {
        if TABLE_STATE.load() == SlotState::Poisoned {
            return Err(Error::Poisoned {
                strategy: StrategyKind::Constant.name(),
            });
        }
        Ok(self.member.handle())
    }

    fn get(&self) -> Option<Handle<Connection>> {
        (TABLE_STATE.load() == SlotState::Ready).then(|| self.member.handle())
    }

    fn state(&self) -> SlotState {
        TABLE_STATE.load()
    }

    fn constructions(&self) -> u64 {
        TABLE_STATE.constructions()
    }
}
