//! `LazySingletonRegistry`: an owned, injectable singleton slot.
//!
//! The registry is an ordinary value.  Callers share it by reference (or
//! behind an `Arc`) instead of reaching for a hidden global, which keeps
//! each test's singleton independent of every other test's.

use std::fmt;

use log::debug;
use lsr_core::{
    Connection, Error, Handle, RegistryConfig, Result, SlotState, StrategyKind,
};

use crate::constant::{ConnectionConstant, ConstantSlot};
use crate::double_checked::DoubleChecked;
use crate::eager::Eager;
use crate::holder::Holder;
use crate::naive::NaiveLazy;
use crate::once_guard::OnceGuard;
use crate::serialized::Serialized;
use crate::strategy::SingletonStrategy;

/// Owns exactly one `R`, built by the chosen strategy.
pub struct LazySingletonRegistry<R> {
    strategy: Box<dyn SingletonStrategy<R>>,
}

impl<R: Send + Sync + 'static> LazySingletonRegistry<R> {
    /// Build a registry around a fallible constructor.
    ///
    /// `Eager` runs `init` immediately and reports its error here.
    ///
    /// # Errors
    /// [`Error::Unsupported`] for `Holder` (whose construction cannot fail;
    /// use [`with_infallible`](Self::with_infallible)) and `Constant` (whose
    /// members are fixed; use [`constant`](LazySingletonRegistry::constant)).
    pub fn new(
        kind: StrategyKind,
        init: impl Fn() -> Result<R> + Send + Sync + 'static,
    ) -> Result<Self> {
        if !kind.supports_fallible_construction() {
            return Err(Error::Unsupported {
                strategy: kind.name(),
                operation: "fallible construction",
            });
        }
        let strategy: Box<dyn SingletonStrategy<R>> = match kind {
            StrategyKind::Eager => Box::new(Eager::new(init)?),
            StrategyKind::NaiveLazy => Box::new(NaiveLazy::new(init)),
            StrategyKind::Serialized => Box::new(Serialized::new(init)),
            StrategyKind::DoubleChecked => Box::new(DoubleChecked::new(init)),
            StrategyKind::OnceGuard => Box::new(OnceGuard::new(init)),
            StrategyKind::Holder | StrategyKind::Constant => {
                unreachable!("{kind} rejected above")
            }
        };
        debug!("registry created with strategy={kind}");
        Ok(Self { strategy })
    }

    /// Build a registry around a constructor that cannot fail.
    ///
    /// Supports every strategy except `Constant`.
    pub fn with_infallible(
        kind: StrategyKind,
        make: impl Fn() -> R + Send + Sync + 'static,
    ) -> Result<Self> {
        match kind {
            StrategyKind::Holder => Ok(Self::from_strategy(Holder::new(make))),
            _ => Self::new(kind, move || Ok(make())),
        }
    }

    /// Wrap an already-built strategy.
    pub fn from_strategy(strategy: impl SingletonStrategy<R> + 'static) -> Self {
        Self {
            strategy: Box::new(strategy),
        }
    }

    /// Return the shared instance, constructing it on first access.
    pub fn get_instance(&self) -> Result<Handle<R>> {
        self.strategy.get_instance()
    }

    /// Return the instance if it is already published.
    pub fn get(&self) -> Option<Handle<R>> {
        self.strategy.get()
    }

    /// Current slot state.
    pub fn state(&self) -> SlotState {
        self.strategy.state()
    }

    /// `true` once the instance is published.
    pub fn is_ready(&self) -> bool {
        self.strategy.is_ready()
    }

    /// Strategy backing this registry.
    pub fn kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    /// Successful constructions so far.
    pub fn constructions(&self) -> u64 {
        self.strategy.constructions()
    }
}

impl LazySingletonRegistry<Connection> {
    /// Registry resolving to one member of the constant connection table.
    pub fn constant(member: ConnectionConstant) -> Self {
        Self::from_strategy(ConstantSlot::new(member))
    }

    /// Build a connection registry from `config`.
    ///
    /// For `Constant`, the configured label and backend must match a table
    /// member.
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        config.validate()?;
        let kind = config.strategy();
        match kind {
            StrategyKind::Constant => ConnectionConstant::lookup(config.label(), config.backend())
                .map(Self::constant)
                .ok_or(Error::Unsupported {
                    strategy: kind.name(),
                    operation: "labels outside the constant table",
                }),
            StrategyKind::Holder => {
                let (label, backend) = (config.label().to_string(), config.backend());
                let delay = config.construction_delay();
                Ok(Self::from_strategy(Holder::new(move || {
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                    Connection::open(label, backend)
                })))
            }
            _ => {
                let config = config.clone();
                Self::new(kind, move || Connection::from_config(&config))
            }
        }
    }
}

impl<R> fmt::Debug for LazySingletonRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazySingletonRegistry")
            .field("kind", &self.strategy.kind())
            .field("state", &self.strategy.state())
            .finish()
    }
}
