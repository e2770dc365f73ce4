//! Error types for the reconciler crate.
//!
//! Errors are strongly typed using thiserror. The classifier itself never
//! fails; everything here belongs to dispatch (running observers) or to
//! loading manifests and filter configuration.

use std::error::Error as StdError;

use thiserror::Error;

use crate::phase::Phase;

/// Boxed error raised by user code (phase methods and ad-hoc callbacks).
///
/// Dispatch is single-threaded, so the error need not be `Send`.
pub type BoxError = Box<dyn StdError + 'static>;

/// Errors raised while delivering an event to its observers.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A phase method of the unit failed.
    #[error("Handler for {phase} phase failed: {source}")]
    Phase {
        /// Phase whose method raised.
        phase: Phase,
        /// The error returned by the unit.
        #[source]
        source: BoxError,
    },

    /// A plain callback (not bound to a phase) failed.
    #[error("Observer of '{event}' failed: {source}")]
    Handler {
        /// Descriptor name the callback was observing.
        event: String,
        /// The error returned by the callback.
        #[source]
        source: BoxError,
    },

    /// The unit was already borrowed by a running phase method.
    #[error("Re-entrant {phase} dispatch while the unit is busy")]
    Reentrant {
        /// Phase whose trampoline could not borrow the unit.
        phase: Phase,
    },

    /// No event with this name exists in the catalog.
    #[error("Unknown event: {name}")]
    UnknownEvent {
        /// Requested descriptor name.
        name: String,
    },
}

impl DispatchError {
    /// Wraps an arbitrary callback failure for the given event.
    pub fn handler(event: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Handler {
            event: event.into(),
            source: source.into(),
        }
    }

    /// Phase that raised this error, if any.
    #[must_use]
    pub const fn phase(&self) -> Option<Phase> {
        match self {
            Self::Phase { phase, .. } | Self::Reentrant { phase } => Some(*phase),
            Self::Handler { .. } | Self::UnknownEvent { .. } => None,
        }
    }
}

/// Errors loading a unit manifest or a filter configuration.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// A JSON document did not match its expected shape.
    #[error("Failed to parse {what}: {source}")]
    Parse {
        /// Which document was being parsed.
        what: &'static str,
        /// Underlying parser error.
        #[source]
        source: serde_json::Error,
    },

    /// A configuration file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that was requested.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A unit, relation, storage, container or action name is malformed.
    #[error("Invalid {field} name '{name}'")]
    InvalidName {
        /// Manifest field the name came from.
        field: &'static str,
        /// The rejected name.
        name: String,
    },

    /// Two catalog entries share a descriptor name.
    #[error("Event '{name}' is defined more than once")]
    DuplicateEvent {
        /// The repeated descriptor name.
        name: String,
    },

    /// A kind name that is not part of the hierarchy.
    #[error("Unknown event kind: {name}")]
    UnknownKind {
        /// The name that failed to parse.
        name: String,
    },
}

/// Top-level error type for the crate.
#[derive(Debug, Error)]
pub enum ReconcilerError {
    /// Delivering an event failed.
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// Loading a manifest or filter configuration failed.
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Invariant violation inside the crate.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of what went wrong.
        message: String,
    },
}

impl ReconcilerError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a dispatch error.
    #[must_use]
    pub const fn is_dispatch(&self) -> bool {
        matches!(self, Self::Dispatch(_))
    }

    /// Returns true if this is a manifest/configuration error.
    #[must_use]
    pub const fn is_manifest(&self) -> bool {
        matches!(self, Self::Manifest(_))
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// Phase whose handler produced this error, if it came from one.
    #[must_use]
    pub const fn phase(&self) -> Option<Phase> {
        match self {
            Self::Dispatch(e) => e.phase(),
            _ => None,
        }
    }
}

/// Result type alias for reconciler operations.
pub type ReconcilerResult<T> = Result<T, ReconcilerError>;
