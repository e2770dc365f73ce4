//! Phase routers: wire a unit's phase methods to the framework.
//!
//! A router is built once per unit. All wiring happens synchronously in the
//! constructor; afterwards the router only gives access to the unit.
//!
//! - [`ReconcilerRouter`] wires maintenance events to `reconcile()`.
//! - [`LifecycleRouter`] wires setup events to `setup()`, teardown events to
//!   `teardown()` and maintenance events to `reconcile()`, in that order.
//!
//! Maintenance covers every hook, so under the default filters a setup event
//! runs both `setup()` and `reconcile()`, and a teardown event runs both
//! `teardown()` and `reconcile()`. On [`InMemoryFramework`] the specific
//! method runs first; other frameworks may not order observers.
//!
//! Errors returned by phase methods are not caught or retried here. They are
//! wrapped in [`DispatchError::Phase`] and surface from the framework's
//! dispatch.
//!
//! [`InMemoryFramework`]: crate::framework::InMemoryFramework

use std::cell::{Ref, RefCell, RefMut};
use std::error::Error as StdError;
use std::rc::Rc;

use tracing::debug;

use crate::error::DispatchError;
use crate::filter::{PhaseFilters, Polarity};
use crate::framework::{Callback, Framework};
use crate::kind::{EventKind, Kind};
use crate::observe::observe_all;
use crate::phase::Phase;

/// A unit that converges on its desired state.
pub trait Reconcile {
    /// Error raised by the unit's phase methods.
    type Error: StdError + 'static;

    /// Called on every maintenance event.
    fn reconcile(&mut self) -> Result<(), Self::Error>;
}

/// A unit that also distinguishes setup and teardown.
pub trait Lifecycle: Reconcile {
    /// Called on setup events (install, start, upgrade).
    fn setup(&mut self) -> Result<(), Self::Error>;

    /// Called on teardown events (stop, remove).
    fn teardown(&mut self) -> Result<(), Self::Error>;
}

/// Common surface of the two router shapes.
pub trait PhaseRouter {
    /// The unit the router forwards to.
    type Unit;

    /// Phases this router wired, in wiring order.
    fn phases(&self) -> &'static [Phase];

    /// Shared handle to the unit, as captured by the trampolines.
    fn shared(&self) -> Rc<RefCell<Self::Unit>>;

    /// Borrows the unit.
    ///
    /// # Panics
    /// If a phase method is currently running.
    fn unit(&self) -> Ref<'_, Self::Unit>;

    /// Mutably borrows the unit. Events dispatched while this borrow is held
    /// fail with [`DispatchError::Reentrant`].
    ///
    /// # Panics
    /// If the unit is already borrowed.
    fn unit_mut(&self) -> RefMut<'_, Self::Unit>;
}

type PhaseFn<U> = fn(&mut U) -> Result<(), <U as Reconcile>::Error>;

// Forwards any matched event to one phase method, dropping the event itself.
fn trampoline<U, K>(unit: &Rc<RefCell<U>>, phase: Phase, run: PhaseFn<U>) -> Callback<K>
where
    U: Reconcile + 'static,
    K: Kind,
{
    let unit = Rc::clone(unit);
    Callback::new(move |_event| {
        let mut guard = unit
            .try_borrow_mut()
            .map_err(|_| DispatchError::Reentrant { phase })?;
        run(&mut *guard).map_err(|e| DispatchError::Phase {
            phase,
            source: Box::new(e),
        })
    })
}

fn wire<F, U>(
    framework: &mut F,
    unit: &Rc<RefCell<U>>,
    filters: &PhaseFilters<F::Kind>,
    phase: Phase,
    run: PhaseFn<U>,
) where
    F: Framework,
    U: Reconcile + 'static,
{
    observe_all(
        framework,
        trampoline(unit, phase, run),
        filters.get(phase),
        Polarity::Matching,
    );
}

/// Single-phase router: every maintenance event runs `reconcile()`.
#[derive(Debug)]
pub struct ReconcilerRouter<U> {
    unit: Rc<RefCell<U>>,
}

impl<U: Reconcile + 'static> ReconcilerRouter<U> {
    /// Wires `unit` with the default maintenance filter.
    pub fn new<F>(framework: &mut F, unit: U) -> Self
    where
        F: Framework<Kind = EventKind>,
    {
        Self::with_filters(framework, unit, &PhaseFilters::default())
    }

    /// Wires `unit` using `filters.maintenance`; the other two filters are unused.
    pub fn with_filters<F: Framework>(
        framework: &mut F,
        unit: U,
        filters: &PhaseFilters<F::Kind>,
    ) -> Self {
        Self::attach(framework, Rc::new(RefCell::new(unit)), filters)
    }

    /// Wires an already shared unit.
    pub fn attach<F: Framework>(
        framework: &mut F,
        unit: Rc<RefCell<U>>,
        filters: &PhaseFilters<F::Kind>,
    ) -> Self {
        wire(framework, &unit, filters, Phase::Maintenance, U::reconcile);
        debug!(phases = ?[Phase::Maintenance], "reconciler router wired");
        Self { unit }
    }
}

impl<U> PhaseRouter for ReconcilerRouter<U> {
    type Unit = U;

    fn phases(&self) -> &'static [Phase] {
        &[Phase::Maintenance]
    }

    fn shared(&self) -> Rc<RefCell<U>> {
        Rc::clone(&self.unit)
    }

    fn unit(&self) -> Ref<'_, U> {
        self.unit.borrow()
    }

    fn unit_mut(&self) -> RefMut<'_, U> {
        self.unit.borrow_mut()
    }
}

/// Three-phase router: setup, teardown and maintenance each forward to
/// their own method.
#[derive(Debug)]
pub struct LifecycleRouter<U> {
    unit: Rc<RefCell<U>>,
}

impl<U: Lifecycle + 'static> LifecycleRouter<U> {
    /// Wires `unit` with the default setup, teardown and maintenance filters.
    pub fn new<F>(framework: &mut F, unit: U) -> Self
    where
        F: Framework<Kind = EventKind>,
    {
        Self::with_filters(framework, unit, &PhaseFilters::default())
    }

    /// Wires `unit` with custom filters.
    pub fn with_filters<F: Framework>(
        framework: &mut F,
        unit: U,
        filters: &PhaseFilters<F::Kind>,
    ) -> Self {
        Self::attach(framework, Rc::new(RefCell::new(unit)), filters)
    }

    /// Wires an already shared unit.
    pub fn attach<F: Framework>(
        framework: &mut F,
        unit: Rc<RefCell<U>>,
        filters: &PhaseFilters<F::Kind>,
    ) -> Self {
        for phase in Phase::ALL {
            let run: PhaseFn<U> = match phase {
                Phase::Setup => U::setup,
                Phase::Teardown => U::teardown,
                Phase::Maintenance => U::reconcile,
            };
            wire(framework, &unit, filters, phase, run);
        }
        debug!(phases = ?Phase::ALL, "lifecycle router wired");
        Self { unit }
    }
}

impl<U> PhaseRouter for LifecycleRouter<U> {
    type Unit = U;

    fn phases(&self) -> &'static [Phase] {
        &Phase::ALL
    }

    fn shared(&self) -> Rc<RefCell<U>> {
        Rc::clone(&self.unit)
    }

    fn unit(&self) -> Ref<'_, U> {
        self.unit.borrow()
    }

    fn unit_mut(&self) -> RefMut<'_, U> {
        self.unit.borrow_mut()
    }
}
