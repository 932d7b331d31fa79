//! # lsr-strategies
//!
//! Singleton initialization strategies behind one contract,
//! [`SingletonStrategy`], plus the owned [`LazySingletonRegistry`] that
//! selects among them at runtime.
//!
//! | Module | Strategy |
//! |--------|----------|
//! | [`eager`] | construct at slot creation |
//! | [`naive`] | unsynchronized check-then-act (anti-pattern) |
//! | [`serialized`] | whole accessor under a mutex |
//! | [`double_checked`] | atomic fast path, locked re-check |
//! | [`once_guard`] | `OnceCell` one-time initialization |
//! | [`holder`] | lazily evaluated static holder |
//! | [`constant`] | statically initialized constant table |

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Enumerated-constant connection table.
pub mod constant;

/// Double-checked locking over an atomic handle.
pub mod double_checked;

/// Eager initialization.
pub mod eager;

/// Holder idiom (`define_holder!`, `Holder<R>`).
pub mod holder;

/// Instrumented constructors.
pub mod init;

/// Unsynchronized check-then-act.
pub mod naive;

/// One-time initialization guard.
pub mod once_guard;

/// The owned registry.
pub mod registry;

/// Fully serialized accessor.
pub mod serialized;

/// The strategy contract.
pub mod strategy;

/// First-access race harness.
pub mod stress;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use constant::{ConnectionConstant, ConstantSlot};
pub use double_checked::DoubleChecked;
pub use eager::Eager;
pub use holder::Holder;
pub use init::{ConstructionCounter, CountingInitializer};
pub use lsr_core::{Handle, SlotState, StrategyKind};
pub use naive::NaiveLazy;
pub use once_guard::OnceGuard;
pub use registry::LazySingletonRegistry;
pub use serialized::Serialized;
pub use strategy::{InitFn, SingletonStrategy};
