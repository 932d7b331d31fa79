//! `Handle<R>`: a shared reference to the singleton resource.
//!
//! Every strategy hands out a `Handle<R>`.  Handles are cheap to clone and
//! compare by *identity* ([`Handle::same_instance`]), which is the property
//! the singleton contract is about: two handles to equal-but-distinct
//! values are a contract violation.

use std::ops::Deref;
use std::sync::Arc;

/// A shared, never-null reference to a value of type `R`.
pub struct Handle<R> {
    inner: Arc<R>,
}

impl<R> Handle<R> {
    /// Create a handle wrapping a freshly allocated `value`.
    pub fn new(value: R) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }

    /// Create a handle from an existing `Arc`.
    pub fn from_arc(arc: Arc<R>) -> Self {
        Self { inner: arc }
    }

    /// Borrow the inner `Arc<R>`.
    pub fn as_arc(&self) -> &Arc<R> {
        &self.inner
    }

    /// Consume the handle, returning the inner `Arc<R>`.
    pub fn into_arc(self) -> Arc<R> {
        self.inner
    }

    /// Return `true` if both handles point to the same allocation.
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Address of the shared allocation, for diagnostics and identity sets.
    pub fn address(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }
}

impl<R> Clone for Handle<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> Deref for Handle<R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.inner
    }
}

impl<R> From<Arc<R>> for Handle<R> {
    fn from(arc: Arc<R>) -> Self {
        Self::from_arc(arc)
    }
}

impl<R: std::fmt::Debug> std::fmt::Debug for Handle<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Handle@{:#x}({:?})", self.address(), self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_identity() {
        let a = Handle::new(String::from("sql"));
        let b = a.clone();
        assert!(a.same_instance(&b));
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn equal_values_are_distinct_instances() {
        let a = Handle::new(7_u32);
        let b = Handle::new(7_u32);
        assert_eq!(*a, *b);
        assert!(!a.same_instance(&b));
    }

    #[test]
    fn from_arc_keeps_allocation() {
        let arc = Arc::new(1.5_f64);
        let h = Handle::from(Arc::clone(&arc));
        assert!(Arc::ptr_eq(h.as_arc(), &arc));
        assert!(Arc::ptr_eq(&h.into_arc(), &arc));
    }
}
