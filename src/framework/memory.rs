//! In-memory event framework.
//!
//! Holds a mutable catalog and an ordered registration table. Intended for
//! embedding, tests, and as a reference implementation of [`Framework`].
//! Observers of one descriptor run in registration order.

use tracing::{debug, trace};

use crate::catalog::{BoundEvent, Catalog, EventDescriptor};
use crate::error::{DispatchError, ManifestError};
use crate::kind::Kind;

use super::traits::{Callback, Framework};

/// One `observe` call recorded by the framework.
#[allow(missing_docs)]
#[derive(Debug, Clone)]
pub struct Registration<K: Kind> {
    pub descriptor: EventDescriptor,
    pub callback: Callback<K>,
}

/// Single-threaded framework backed by plain vectors.
#[derive(Debug, Clone)]
pub struct InMemoryFramework<K: Kind> {
    catalog: Catalog<K>,
    registrations: Vec<Registration<K>>,
}

impl<K: Kind> Default for InMemoryFramework<K> {
    fn default() -> Self {
        Self::new(Catalog::new())
    }
}

impl<K: Kind> InMemoryFramework<K> {
    /// Framework exposing `catalog`, with no observers.
    #[must_use]
    pub const fn new(catalog: Catalog<K>) -> Self {
        Self {
            catalog,
            registrations: Vec::new(),
        }
    }

    /// Adds an event slot. Existing registrations are untouched.
    pub fn define(&mut self, name: &str, kind: K) -> Result<(), ManifestError> {
        self.catalog.define(name, kind)
    }

    /// Removes an event slot together with every observer bound to it.
    ///
    /// A slot defined again under the same name starts with no observers.
    pub fn undefine(&mut self, name: &str) -> Option<K> {
        let kind = self.catalog.undefine(name)?;
        let before = self.registrations.len();
        self.registrations.retain(|r| r.descriptor.name() != name);
        debug!(
            event = name,
            dropped = before - self.registrations.len(),
            "event undefined"
        );
        Some(kind)
    }

    /// All registrations in the order they were made.
    #[must_use]
    pub fn registrations(&self) -> &[Registration<K>] {
        &self.registrations
    }

    /// Number of observers bound to `name`.
    #[must_use]
    pub fn observer_count(&self, name: &str) -> usize {
        self.registrations
            .iter()
            .filter(|r| r.descriptor.name() == name)
            .count()
    }

    /// Kinds of every observed descriptor, first registration first, deduplicated.
    ///
    /// Descriptors observed without being in the catalog are skipped.
    #[must_use]
    pub fn observed_kinds(&self) -> Vec<K> {
        let mut out: Vec<K> = Vec::new();
        for r in &self.registrations {
            let Some(kind) = self.catalog.kind_of(r.descriptor.name()) else {
                continue;
            };
            if !out.contains(&kind) {
                out.push(kind);
            }
        }
        out
    }

    /// Drops every registration.
    pub fn clear_observers(&mut self) {
        self.registrations.clear();
    }

    /// Fires the named event.
    ///
    /// Runs each observer in registration order and stops at the first error,
    /// which is returned unchanged. Returns how many observers ran.
    pub fn emit(&self, name: &str) -> Result<usize, DispatchError> {
        let Some((descriptor, kind)) = self.catalog.get(name) else {
            return Err(DispatchError::UnknownEvent {
                name: name.to_string(),
            });
        };
        let event = BoundEvent::new(descriptor.clone(), kind);
        self.dispatch(&event)
    }

    /// Delivers an already bound event to the observers of its descriptor.
    pub fn dispatch(&self, event: &BoundEvent<K>) -> Result<usize, DispatchError> {
        let observers: Vec<&Callback<K>> = self
            .registrations
            .iter()
            .filter(|r| r.descriptor == event.descriptor)
            .map(|r| &r.callback)
            .collect();

        debug!(
            event = %event.descriptor,
            kind = ?event.kind,
            id = %event.id,
            observers = observers.len(),
            "dispatching event"
        );

        for callback in &observers {
            callback.call(event)?;
        }
        Ok(observers.len())
    }
}

impl<K: Kind> Framework for InMemoryFramework<K> {
    type Kind = K;

    fn events(&self) -> Catalog<K> {
        self.catalog.clone()
    }

    fn observe(&mut self, descriptor: &EventDescriptor, callback: Callback<K>) {
        trace!(event = %descriptor, "observer registered");
        self.registrations.push(Registration {
            descriptor: descriptor.clone(),
            callback,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::kind::EventKind;

    fn framework() -> InMemoryFramework<EventKind> {
        let mut fw = InMemoryFramework::default();
        fw.define("install", EventKind::Install).unwrap();
        fw.define("config_changed", EventKind::ConfigChanged).unwrap();
        fw
    }

    #[test]
    fn emit_unknown_event() {
        let fw = framework();
        let err = fw.emit("nope").unwrap_err();
        assert!(matches!(err, DispatchError::UnknownEvent { name } if name == "nope"));
    }

    #[test]
    fn observers_run_in_registration_order() {
        let mut fw = framework();
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in ["a", "b", "c"] {
            let log = Rc::clone(&log);
            fw.observe(
                &EventDescriptor::new("install"),
                Callback::new(move |_| {
                    log.borrow_mut().push(tag);
                    Ok(())
                }),
            );
        }
        assert_eq!(fw.emit("install").unwrap(), 3);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(fw.emit("config_changed").unwrap(), 0);
    }

    #[test]
    fn emit_stops_at_first_error() {
        let mut fw = framework();
        let ran = Rc::new(RefCell::new(0));
        fw.observe(
            &EventDescriptor::new("install"),
            Callback::new(|ev| Err(DispatchError::handler(ev.descriptor.name(), "boom"))),
        );
        let ran2 = Rc::clone(&ran);
        fw.observe(
            &EventDescriptor::new("install"),
            Callback::new(move |_| {
                *ran2.borrow_mut() += 1;
                Ok(())
            }),
        );
        let err = fw.emit("install").unwrap_err();
        assert!(matches!(err, DispatchError::Handler { .. }));
        assert_eq!(*ran.borrow(), 0);
    }

    #[test]
    fn events_returns_a_fresh_snapshot() {
        let mut fw = framework();
        let before = fw.events();
        fw.define("stop", EventKind::Stop).unwrap();
        assert_eq!(before.len(), 2);
        assert_eq!(fw.events().len(), 3);
    }

    #[test]
    fn undefine_drops_observers_of_the_slot() {
        let mut fw = framework();
        let ran = Rc::new(RefCell::new(0));
        let ran2 = Rc::clone(&ran);
        fw.observe(
            &EventDescriptor::new("install"),
            Callback::new(move |_| {
                *ran2.borrow_mut() += 1;
                Ok(())
            }),
        );
        fw.observe(&EventDescriptor::new("config_changed"), Callback::noop());

        assert_eq!(fw.undefine("install"), Some(EventKind::Install));
        assert_eq!(fw.observer_count("install"), 0);
        assert_eq!(fw.observer_count("config_changed"), 1);

        fw.define("install", EventKind::ConfigChanged).unwrap();
        assert_eq!(fw.emit("install").unwrap(), 0);
        assert_eq!(*ran.borrow(), 0);
        assert_eq!(fw.undefine("missing"), None);
    }

    #[test]
    fn clear_observers_allows_rewiring() {
        let mut fw = framework();
        let cb = Callback::noop();
        fw.observe(&EventDescriptor::new("install"), cb.clone());
        fw.observe(&EventDescriptor::new("config_changed"), cb.clone());
        fw.clear_observers();
        assert!(fw.registrations().is_empty());
        assert_eq!(fw.emit("install").unwrap(), 0);

        fw.observe(&EventDescriptor::new("install"), cb);
        assert_eq!(fw.emit("install").unwrap(), 1);
        assert_eq!(fw.events().len(), 2);
    }

    #[test]
    fn observed_kinds_deduplicates() {
        let mut fw = framework();
        let cb = Callback::noop();
        fw.observe(&EventDescriptor::new("install"), cb.clone());
        fw.observe(&EventDescriptor::new("install"), cb.clone());
        fw.observe(&EventDescriptor::new("config_changed"), cb);
        assert_eq!(
            fw.observed_kinds(),
            vec![EventKind::Install, EventKind::ConfigChanged]
        );
        assert_eq!(fw.observer_count("install"), 2);
        assert!(fw.registrations()[0].callback.same_as(&fw.registrations()[1].callback));
    }
}
