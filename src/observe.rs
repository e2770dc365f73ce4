//! Event classification and observer wiring.
//!
//! The classifier walks a catalog, tests each entry's kind against a
//! [`KindFilter`] with a [`Polarity`], and registers one callback on every
//! selected descriptor. It has no error paths: an empty catalog or a filter
//! that selects nothing simply registers nothing.
//!
//! Wiring is not deduplicated. Calling any of these functions twice with the
//! same callback registers it twice, and it will then fire twice.

use crate::catalog::EventDescriptor;
use crate::filter::{KindFilter, Polarity, MAINTENANCE_EVENTS, SETUP_EVENTS, TEARDOWN_EVENTS};
use crate::framework::{Callback, Framework};
use crate::kind::{EventKind, Kind};

/// Descriptors of `catalog` selected by `filter` under `polarity`, in catalog order.
pub fn select<K, I>(catalog: I, filter: &KindFilter<K>, polarity: Polarity) -> Vec<EventDescriptor>
where
    K: Kind,
    I: IntoIterator<Item = (EventDescriptor, K)>,
{
    catalog
        .into_iter()
        .filter(|(_, kind)| filter.selects(*kind, polarity))
        .map(|(descriptor, _)| descriptor)
        .collect()
}

/// Registers `callback` on every selected descriptor of an explicit catalog.
///
/// `register` is the framework's registration primitive. Registration order
/// follows catalog order.
pub fn observe_catalog<K, I, R>(
    catalog: I,
    mut register: R,
    callback: &Callback<K>,
    filter: &KindFilter<K>,
    polarity: Polarity,
) where
    K: Kind,
    I: IntoIterator<Item = (EventDescriptor, K)>,
    R: FnMut(&EventDescriptor, Callback<K>),
{
    for descriptor in select(catalog, filter, polarity) {
        register(&descriptor, callback.clone());
    }
}

/// Observes every event of the framework's catalog whose kind is (or, when
/// reverted, is not) covered by `filter`.
///
/// The catalog is enumerated afresh on each call.
pub fn observe_all<F: Framework>(
    framework: &mut F,
    callback: Callback<F::Kind>,
    filter: &KindFilter<F::Kind>,
    polarity: Polarity,
) {
    let catalog = framework.events();
    observe_catalog(
        catalog,
        |descriptor, cb| framework.observe(descriptor, cb),
        &callback,
        filter,
        polarity,
    );
}

/// Observes every event the framework exposes.
pub fn observe_every<F: Framework>(framework: &mut F, callback: Callback<F::Kind>) {
    observe_all(framework, callback, &KindFilter::Everything, Polarity::Matching);
}

/// Observes all maintenance events: anything hook-triggered, setup and
/// teardown hooks included.
pub fn observe_maintenance_events<F>(framework: &mut F, callback: Callback<EventKind>)
where
    F: Framework<Kind = EventKind>,
{
    observe_all(framework, callback, &MAINTENANCE_EVENTS, Polarity::Matching);
}

/// Observes all setup events.
pub fn observe_setup_events<F>(framework: &mut F, callback: Callback<EventKind>)
where
    F: Framework<Kind = EventKind>,
{
    observe_all(framework, callback, &SETUP_EVENTS, Polarity::Matching);
}

/// Observes all teardown events.
pub fn observe_teardown_events<F>(framework: &mut F, callback: Callback<EventKind>)
where
    F: Framework<Kind = EventKind>,
{
    observe_all(framework, callback, &TEARDOWN_EVENTS, Polarity::Matching);
}
