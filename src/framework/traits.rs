//! Framework and callback abstractions.

use std::fmt;
use std::rc::Rc;

use crate::catalog::{BoundEvent, Catalog, EventDescriptor};
use crate::error::DispatchError;
use crate::kind::Kind;

type CallbackFn<K> = dyn Fn(&BoundEvent<K>) -> Result<(), DispatchError>;

/// A side-effecting observer bound to zero or more descriptors.
///
/// Cloning is cheap and yields a handle to the same function, so one callback
/// can be registered on every selected descriptor.
pub struct Callback<K: Kind> {
    inner: Rc<CallbackFn<K>>,
}

impl<K: Kind> Callback<K> {
    /// Wraps a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&BoundEvent<K>) -> Result<(), DispatchError> + 'static,
    {
        Self { inner: Rc::new(f) }
    }

    /// Callback that does nothing.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(|_| Ok(()))
    }

    /// Runs the callback for `event`.
    pub fn call(&self, event: &BoundEvent<K>) -> Result<(), DispatchError> {
        (self.inner)(event)
    }

    /// True if both handles point at the same function.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<K: Kind> Clone for Callback<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<K: Kind> fmt::Debug for Callback<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("handles", &Rc::strong_count(&self.inner))
            .finish()
    }
}

/// The two capabilities consumed from the event framework.
///
/// # Contract
/// - `events` returns a fresh snapshot on every call; callers never cache it.
/// - `observe` appends: registering the same callback twice makes it fire twice.
///   Observers of one descriptor are expected to run in registration order,
///   but callers must not rely on that unless the implementation says so.
pub trait Framework {
    /// Kind hierarchy the catalog is expressed in.
    type Kind: Kind;

    /// Enumerate every observable event slot.
    fn events(&self) -> Catalog<Self::Kind>;

    /// Bind `callback` to fire whenever `descriptor` occurs.
    fn observe(&mut self, descriptor: &EventDescriptor, callback: Callback<Self::Kind>);
}
