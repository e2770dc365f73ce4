//! Kind filters, polarity and the default phase filters.
//!
//! A [`KindFilter`] is a hierarchy-membership test: a kind matches when it
//! equals, or specializes, any kind in the filter. [`Polarity`] flips the
//! selection. The three default filters are `const` values; callers who need
//! different routing build a [`PhaseFilters`] instead of mutating them.

use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::{ManifestError, ReconcilerResult};
use crate::kind::{EventKind, Kind};
use crate::phase::Phase;

/// Kinds routed to `reconcile()`: anything hook-triggered.
///
/// Setup and teardown kinds are hooks too, so they also match here.
pub const MAINTENANCE_EVENTS: KindFilter<EventKind> = KindFilter::of(&[EventKind::Hook]);

/// Kinds routed to `setup()`.
pub const SETUP_EVENTS: KindFilter<EventKind> = KindFilter::of(&[
    EventKind::UpgradeCharm,
    EventKind::Install,
    EventKind::Start,
]);

/// Kinds routed to `teardown()`.
pub const TEARDOWN_EVENTS: KindFilter<EventKind> =
    KindFilter::of(&[EventKind::Stop, EventKind::Remove]);

/// Whether a filter selects the kinds it matches or the kinds it does not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Select matching kinds.
    #[default]
    Matching,
    /// Select non-matching kinds.
    Reverted,
}

impl Polarity {
    /// True for [`Polarity::Reverted`].
    #[must_use]
    pub const fn is_reverted(self) -> bool {
        matches!(self, Self::Reverted)
    }

    /// Applies this polarity to a raw match result.
    #[must_use]
    pub const fn apply(self, matched: bool) -> bool {
        matched != self.is_reverted()
    }
}

impl From<bool> for Polarity {
    /// `true` means revert.
    fn from(revert: bool) -> Self {
        if revert {
            Self::Reverted
        } else {
            Self::Matching
        }
    }
}

/// A single kind or a finite set of kinds used as a hierarchy-membership test.
///
/// Equality is set equality: order and repeats in the listed kinds are ignored.
#[derive(Clone)]
pub enum KindFilter<K: Kind> {
    /// The universal kind: matches everything.
    Everything,
    /// Matches kinds equal to, or specializing, any listed kind.
    ///
    /// An empty set matches nothing.
    Kinds(Cow<'static, [K]>),
}

impl<K: Kind> KindFilter<K> {
    /// Filter over a static set of kinds. Usable in `const` context.
    #[must_use]
    pub const fn of(kinds: &'static [K]) -> Self {
        Self::Kinds(Cow::Borrowed(kinds))
    }

    /// Filter over a single kind.
    #[must_use]
    pub fn single(kind: K) -> Self {
        Self::Kinds(Cow::Owned(vec![kind]))
    }

    /// Filter over an owned set of kinds.
    #[must_use]
    pub fn set(kinds: impl IntoIterator<Item = K>) -> Self {
        Self::Kinds(Cow::Owned(kinds.into_iter().collect()))
    }

    /// Filter that matches nothing.
    #[must_use]
    pub const fn nothing() -> Self {
        Self::Kinds(Cow::Borrowed(&[]))
    }

    /// Hierarchy-membership test for `kind`.
    #[must_use]
    pub fn matches(&self, kind: K) -> bool {
        match self {
            Self::Everything => true,
            Self::Kinds(kinds) => kinds.iter().any(|a| kind.is_specialization_of(*a)),
        }
    }

    /// Membership test with polarity applied.
    #[must_use]
    pub fn selects(&self, kind: K, polarity: Polarity) -> bool {
        polarity.apply(self.matches(kind))
    }

    /// Listed kinds, or `None` for [`KindFilter::Everything`].
    #[must_use]
    pub fn kinds(&self) -> Option<&[K]> {
        match self {
            Self::Everything => None,
            Self::Kinds(kinds) => Some(kinds.as_ref()),
        }
    }
}

impl<K: Kind> PartialEq for KindFilter<K> {
    fn eq(&self, other: &Self) -> bool {
        match (self.kinds(), other.kinds()) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                a.iter().all(|k| b.contains(k)) && b.iter().all(|k| a.contains(k))
            }
            _ => false,
        }
    }
}

impl<K: Kind> Eq for KindFilter<K> {}

impl<K: Kind> Default for KindFilter<K> {
    fn default() -> Self {
        Self::Everything
    }
}

impl<K: Kind> fmt::Debug for KindFilter<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kinds() {
            None => f.write_str("Everything"),
            Some(kinds) => f.debug_set().entries(kinds).finish(),
        }
    }
}

impl<K: Kind> From<K> for KindFilter<K> {
    fn from(kind: K) -> Self {
        Self::single(kind)
    }
}

impl<K: Kind> FromIterator<K> for KindFilter<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self::set(iter)
    }
}

// Wire form: "*" for everything, otherwise a kind or a list of kinds.
const EVERYTHING: &str = "*";

impl<K: Kind + Serialize> Serialize for KindFilter<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.kinds() {
            None => serializer.serialize_str(EVERYTHING),
            Some(kinds) => kinds.serialize(serializer),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FilterRepr<K> {
    Kinds(Vec<K>),
    Single(K),
    Keyword(String),
}

impl<'de, K: Kind + Deserialize<'de>> Deserialize<'de> for KindFilter<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match FilterRepr::<K>::deserialize(deserializer)? {
            FilterRepr::Kinds(kinds) => Ok(Self::Kinds(Cow::Owned(kinds))),
            FilterRepr::Single(kind) => Ok(Self::single(kind)),
            FilterRepr::Keyword(word) if word == EVERYTHING => Ok(Self::Everything),
            FilterRepr::Keyword(word) => Err(de::Error::custom(format!(
                "Unknown event kind '{word}'"
            ))),
        }
    }
}

/// The three filters a phase router wires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "K: Serialize",
    deserialize = "K: Deserialize<'de>"
))]
pub struct PhaseFilters<K: Kind> {
    /// Kinds routed to `setup()`.
    pub setup: KindFilter<K>,
    /// Kinds routed to `reconcile()`.
    pub maintenance: KindFilter<K>,
    /// Kinds routed to `teardown()`.
    pub teardown: KindFilter<K>,
}

impl Default for PhaseFilters<EventKind> {
    fn default() -> Self {
        Self {
            setup: SETUP_EVENTS,
            maintenance: MAINTENANCE_EVENTS,
            teardown: TEARDOWN_EVENTS,
        }
    }
}

impl<K: Kind> PhaseFilters<K> {
    /// Filter wired for `phase`.
    #[must_use]
    pub const fn get(&self, phase: Phase) -> &KindFilter<K> {
        match phase {
            Phase::Setup => &self.setup,
            Phase::Maintenance => &self.maintenance,
            Phase::Teardown => &self.teardown,
        }
    }

    /// Phases a kind is routed to, in router wiring order.
    ///
    /// Setup and teardown kinds normally come back together with
    /// [`Phase::Maintenance`].
    #[must_use]
    pub fn phases_for(&self, kind: K) -> Vec<Phase> {
        Phase::ALL
            .into_iter()
            .filter(|phase| self.get(*phase).matches(kind))
            .collect()
    }
}

impl<K> PhaseFilters<K>
where
    K: Kind + for<'de> Deserialize<'de>,
{
    /// Parses a filter configuration from JSON.
    ///
    /// Missing keys are not defaulted: all three filters must be given.
    pub fn from_json(json: &str) -> ReconcilerResult<Self> {
        serde_json::from_str(json).map_err(|source| {
            ManifestError::Parse {
                what: "phase filters",
                source,
            }
            .into()
        })
    }

    /// Reads and parses a filter configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> ReconcilerResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }
}
