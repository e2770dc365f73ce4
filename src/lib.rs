//! # reconciler - lifecycle event routing for operator-framework units
//!
//! A unit receives named lifecycle events from its framework: install, start,
//! relation changes, status updates, stop, user actions. This crate sorts
//! those events into three phases and forwards each to a phase method:
//!
//! - **setup**: upgrade, install, start → `setup()`
//! - **maintenance**: any hook-triggered event → `reconcile()`
//! - **teardown**: stop, remove → `teardown()`
//!
//! Maintenance deliberately overlaps the other two: a unit wired with
//! [`LifecycleRouter`] sees `setup()` *and* `reconcile()` on install.
//!
//! ## Core Concepts
//!
//! - **Kind**: a class of event in a hierarchy ([`Kind`], [`EventKind`])
//! - **Catalog**: the event slots a framework exposes ([`Catalog`])
//! - **KindFilter**: hierarchy-membership test, optionally reverted ([`KindFilter`], [`Polarity`])
//! - **Router**: wires a unit's phase methods at construction ([`ReconcilerRouter`], [`LifecycleRouter`])
//!
//! ## Usage
//!
//! ```rust,ignore
//! use reconciler::{InMemoryFramework, Lifecycle, LifecycleRouter, Reconcile, UnitManifest};
//!
//! struct Workload;
//!
//! impl Reconcile for Workload {
//!     type Error = std::io::Error;
//!     fn reconcile(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! }
//!
//! impl Lifecycle for Workload {
//!     fn setup(&mut self) -> Result<(), Self::Error> { Ok(()) }
//!     fn teardown(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! }
//!
//! let mut framework = UnitManifest::new("workload").framework()?;
//! let _router = LifecycleRouter::new(&mut framework, Workload);
//! framework.emit("install")?; // setup() then reconcile()
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod error;
pub mod filter;
pub mod framework;
pub mod kind;
pub mod manifest;
pub mod observe;
pub mod phase;
pub mod router;

// Re-export primary types at crate root for convenience
pub use catalog::{BoundEvent, Catalog, EventDescriptor, EventId};
pub use error::{BoxError, DispatchError, ManifestError, ReconcilerError, ReconcilerResult};
pub use filter::{
    KindFilter, PhaseFilters, Polarity, MAINTENANCE_EVENTS, SETUP_EVENTS, TEARDOWN_EVENTS,
};
pub use framework::{Callback, Framework, InMemoryFramework, Registration};
pub use kind::{EventKind, Kind};
pub use manifest::{ActionSpec, Container, Endpoint, StorageSpec, UnitManifest};
pub use observe::{
    observe_all, observe_catalog, observe_every, observe_maintenance_events,
    observe_setup_events, observe_teardown_events, select,
};
pub use phase::Phase;
pub use router::{Lifecycle, LifecycleRouter, PhaseRouter, Reconcile, ReconcilerRouter};
