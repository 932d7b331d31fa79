//! Identifiers for the singleton initialization strategies.

use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, Result};

/// The initialization strategy backing a singleton slot.
///
/// | Strategy | Lazy | Safe under concurrent first access |
/// |----------|------|------------------------------------|
/// | `Eager` | no | yes |
/// | `NaiveLazy` | yes | **no** |
/// | `Serialized` | yes | yes (every read takes the lock) |
/// | `DoubleChecked` | yes | yes |
/// | `OnceGuard` | yes | yes |
/// | `Holder` | yes | yes |
/// | `Constant` | yes | yes (not parameterizable) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StrategyKind {
    /// Constructed when the slot is created.
    Eager,
    /// Unsynchronized check-then-act.
    NaiveLazy,
    /// Whole accessor under one mutex.
    Serialized,
    /// Atomic fast path, locked and re-checked slow path.
    DoubleChecked,
    /// One-time initialization guard.
    #[default]
    OnceGuard,
    /// Lazily evaluated static holder.
    Holder,
    /// Member of a statically initialized constant table.
    Constant,
}

impl StrategyKind {
    /// Every strategy, in declaration order.
    pub const ALL: [StrategyKind; 7] = [
        Self::Eager,
        Self::NaiveLazy,
        Self::Serialized,
        Self::DoubleChecked,
        Self::OnceGuard,
        Self::Holder,
        Self::Constant,
    ];

    /// Stable snake_case name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Eager => "eager",
            Self::NaiveLazy => "naive_lazy",
            Self::Serialized => "serialized",
            Self::DoubleChecked => "double_checked",
            Self::OnceGuard => "once_guard",
            Self::Holder => "holder",
            Self::Constant => "constant",
        }
    }

    /// `false` only for the unsynchronized check-then-act strategy.
    pub const fn is_concurrency_safe(self) -> bool {
        !matches!(self, Self::NaiveLazy)
    }

    /// `true` if a constructor failure can be reported and retried.
    pub const fn supports_fallible_construction(self) -> bool {
        !matches!(self, Self::Holder | Self::Constant)
    }

    /// Strategies that satisfy the exactly-once contract under concurrency.
    pub fn safe() -> impl Iterator<Item = StrategyKind> {
        Self::ALL.into_iter().filter(|k| k.is_concurrency_safe())
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|k| k.name() == needle)
            .ok_or_else(|| Error::UnknownStrategy(s.to_string()))
    }
}
