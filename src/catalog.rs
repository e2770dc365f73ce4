//! Event descriptors, catalogs and bound event instances.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ManifestError;
use crate::kind::Kind;

/// Handle naming one observable event slot, e.g. `db_relation_changed`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventDescriptor(String);

impl EventDescriptor {
    /// Creates a descriptor from its name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The descriptor name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventDescriptor {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for EventDescriptor {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for EventDescriptor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A snapshot of the events a framework exposes, in declaration order.
///
/// Each descriptor appears once and carries exactly one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog<K: Kind> {
    entries: Vec<(EventDescriptor, K)>,
}

impl<K: Kind> Default for Catalog<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Kind> Catalog<K> {
    /// Empty catalog.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends an event. Rejects a descriptor that is already present.
    pub fn define(
        &mut self,
        descriptor: impl Into<EventDescriptor>,
        kind: K,
    ) -> Result<(), ManifestError> {
        let descriptor = descriptor.into();
        if self.kind_of(descriptor.name()).is_some() {
            return Err(ManifestError::DuplicateEvent {
                name: descriptor.0,
            });
        }
        self.entries.push((descriptor, kind));
        Ok(())
    }

    /// Removes an event, returning its kind if it was present.
    pub fn undefine(&mut self, name: &str) -> Option<K> {
        let idx = self.entries.iter().position(|(d, _)| d.name() == name)?;
        Some(self.entries.remove(idx).1)
    }

    /// Kind of the named event.
    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<K> {
        self.entries
            .iter()
            .find(|(d, _)| d.name() == name)
            .map(|(_, k)| *k)
    }

    /// Looks up the descriptor and kind for a name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<(&EventDescriptor, K)> {
        self.entries
            .iter()
            .find(|(d, _)| d.name() == name)
            .map(|(d, k)| (d, *k))
    }

    /// Iterates entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&EventDescriptor, K)> + '_ {
        self.entries.iter().map(|(d, k)| (d, *k))
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the catalog has no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Kind> IntoIterator for Catalog<K> {
    type Item = (EventDescriptor, K);
    type IntoIter = std::vec::IntoIter<(EventDescriptor, K)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Kind> TryFrom<Vec<(EventDescriptor, K)>> for Catalog<K> {
    type Error = ManifestError;

    fn try_from(entries: Vec<(EventDescriptor, K)>) -> Result<Self, Self::Error> {
        let mut catalog = Self::new();
        for (d, k) in entries {
            catalog.define(d, k)?;
        }
        Ok(catalog)
    }
}

/// Unique identifier of one delivered event instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Create a new random event id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An event instance delivered to observers of its descriptor.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundEvent<K> {
    pub id: EventId,
    pub descriptor: EventDescriptor,
    pub kind: K,
    pub fired_at: DateTime<Utc>,
}

impl<K: Kind> BoundEvent<K> {
    /// Binds a fresh instance to `descriptor`.
    #[must_use]
    pub fn new(descriptor: EventDescriptor, kind: K) -> Self {
        Self {
            id: EventId::new(),
            descriptor,
            kind,
            fired_at: Utc::now(),
        }
    }
}
