//! # lsr-core
//!
//! Core types, traits, and error definitions for lazy-singleton-rs.
//!
//! This crate provides the building blocks shared by every initialization
//! strategy: the error hierarchy, the identity-comparable [`Handle`], the
//! [`SlotState`] machine, the reference [`Connection`] resource, and the
//! [`RegistryConfig`] used to build a registry.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Construction-time configuration.
pub mod config;

/// Error types and the `ensure!` / `fail!` macros.
pub mod errors;

/// Identity-comparable shared handle (`Handle<R>`).
pub mod handle;

/// Strategy identifiers.
pub mod kind;

/// Stderr logging bootstrap.
pub mod logging;

/// The reference resource: a labeled connection.
pub mod resource;

/// Slot state machine (`Empty → Constructing → Ready`).
pub mod slot;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use config::RegistryConfig;
pub use errors::{Error, Result};
pub use handle::Handle;
pub use kind::StrategyKind;
pub use resource::{Backend, Connection};
pub use slot::{ConstructionGuard, SlotState, StateCell};
