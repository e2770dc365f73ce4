//! The event framework the classifier wires into.
//!
//! The framework is an external collaborator: it owns the event catalog and
//! the table of observers. This crate only needs to enumerate the catalog and
//! register callbacks, which is what [`Framework`] captures. An in-memory
//! implementation is provided for embedding and tests.

mod memory;
mod traits;

pub use memory::{InMemoryFramework, Registration};
pub use traits::{Callback, Framework};
