//! Holder idiom: bind the resource to a lazily evaluated static.
//!
//! The runtime guarantees that a `LazyLock` runs its initializer exactly
//! once and that every thread sees the finished value, so there is no
//! locking code here at all.
//!
//! Two forms are provided:
//! * [`define_holder!`](crate::define_holder) declares a type whose
//!   `get_instance()` reads a `static` nested inside the function, the
//!   closest Rust has to a nested holder class.
//! * [`Holder`] does the same per value, so it can sit behind a
//!   [`LazySingletonRegistry`](crate::registry::LazySingletonRegistry).
//!
//! Construction must be infallible.  A panicking initializer poisons the
//! `LazyLock`: a [`Holder`] then reports [`SlotState::Poisoned`] and
//! answers every later `get_instance` with [`Error::Poisoned`].

use std::sync::{Arc, LazyLock};

use log::{debug, trace};
use lsr_core::{Error, Handle, Result, SlotState, StateCell, StrategyKind};

use crate::strategy::SingletonStrategy;

type HolderInit<R> = Box<dyn FnOnce() -> Arc<R> + Send>;

/// Declare a holder type with an associated `get_instance()`.
///
/// The initializer runs on first call, exactly once per process.
///
/// # Example
/// ```
/// use lsr_strategies::define_holder;
///
/// define_holder!(
///     /// Numeric-backend connection held in a static.
///     pub NumericDb: u32 = 1;
/// );
///
/// let a = NumericDb::get_instance();
/// let b = NumericDb::get_instance();
/// assert!(a.same_instance(&b));
/// assert_eq!(*a, 1);
/// ```
#[macro_export]
macro_rules! define_holder {
    ($(#[$meta:meta])* $vis:vis $name:ident : $ty:ty = $init:expr;) => {
        $(#[$meta])*
        $vis struct $name;

        impl $name {
            /// Return the process-wide instance, constructing it on first call.
            #[allow(dead_code)]
            pub fn get_instance() -> $crate::Handle<$ty> {
                static INSTANCE: ::std::sync::LazyLock<::std::sync::Arc<$ty>> =
                    ::std::sync::LazyLock::new(|| ::std::sync::Arc::new($init));
                $crate::Handle::from_arc(::std::sync::Arc::clone(&*INSTANCE))
            }
        }
    };
}

/// Per-value holder backed by a `LazyLock`.
pub struct Holder<R> {
    lazy: LazyLock<Arc<R>, HolderInit<R>>,
    state: Arc<StateCell>,
}

impl<R: Send + Sync + 'static> Holder<R> {
    /// Create a holder that will run `make` on first access.
    pub fn new(make: impl FnOnce() -> R + Send + 'static) -> Self {
        let state = Arc::new(StateCell::new());
        let tracker = Arc::clone(&state);
        let init: HolderInit<R> = Box::new(move || {
            let claim = tracker.begin().map(|guard| guard.poison_on_abandon());
            debug!("holder: constructing");
            let value = Arc::new(make());
            if let Ok(guard) = claim {
                guard.commit();
            }
            debug!("holder: constructed");
            value
        });
        Self {
            lazy: LazyLock::new(init),
            state,
        }
    }
}

impl<R: Send + Sync + 'static> SingletonStrategy<R> for Holder<R> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Holder
    }

    fn get_instance(&self) -> Result<Handle<R>> {
        match self.state.load() {
            SlotState::Poisoned => {
                return Err(Error::Poisoned {
                    strategy: StrategyKind::Holder.name(),
                })
            }
            SlotState::Ready => trace!("holder: fast path"),
            SlotState::Empty | SlotState::Constructing => {}
        }
        Ok(Handle::from_arc(Arc::clone(&*self.lazy)))
    }

    fn get(&self) -> Option<Handle<R>> {
        if self.state.load() == SlotState::Ready {
            Some(Handle::from_arc(Arc::clone(&*self.lazy)))
        } else {
            None
        }
    }

    fn state(&self) -> SlotState {
        self.state.load()
    }

    fn constructions(&self) -> u64 {
        self.state.constructions()
    }
}
