//! # lazy-singleton
//!
//! Exactly-once construction of a shared resource under arbitrary
//! concurrent first access.
//!
//! This crate is a **façade** that re-exports the workspace crates.
//! Application code should depend on it rather than on the individual
//! `lsr-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use lazy_singleton::{LazySingletonRegistry, RegistryConfig, StrategyKind};
//!
//! let config = RegistryConfig::default().with_strategy(StrategyKind::OnceGuard);
//! let registry = LazySingletonRegistry::from_config(&config).unwrap();
//!
//! let a = registry.get_instance().unwrap();
//! let b = registry.get_instance().unwrap();
//! assert!(a.same_instance(&b));
//! assert_eq!(a.tag(), "primary");
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types: errors, handles, slot state, configuration.
pub use lsr_core as core;

/// Initialization strategies and the registry.
pub use lsr_strategies as strategies;

pub use lsr_core::{
    Backend, Connection, Error, Handle, RegistryConfig, Result, SlotState, StrategyKind,
};
pub use lsr_strategies::{
    define_holder, ConnectionConstant, LazySingletonRegistry, SingletonStrategy,
};
