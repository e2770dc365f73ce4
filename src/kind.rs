//! Event kinds and the kind hierarchy.
//!
//! A kind names a class of occurrence in the framework's catalog. Kinds form a
//! hierarchy: a kind may specialize zero or more parent kinds, and a filter
//! written against a parent also matches every descendant.
//!
//! [`Kind`] is the pluggable hierarchy test. [`EventKind`] is the operator
//! framework's own tree, expressed as a closed enum with a static parent
//! table so membership never needs runtime type information.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ManifestError;

/// A node in an event-kind hierarchy.
///
/// The parent table must be acyclic.
pub trait Kind: Copy + Eq + fmt::Debug + 'static {
    /// Direct ancestors of this kind. Roots return an empty slice.
    fn parents(self) -> &'static [Self];

    /// True if `self` equals `ancestor` or transitively specializes it.
    fn is_specialization_of(self, ancestor: Self) -> bool {
        self == ancestor
            || self
                .parents()
                .iter()
                .any(|parent| parent.is_specialization_of(ancestor))
    }

    /// Every ancestor of this kind, nearest first, without duplicates.
    /// Does not include `self`.
    fn ancestors(self) -> Vec<Self> {
        let mut out: Vec<Self> = Vec::new();
        let mut frontier: Vec<Self> = self.parents().to_vec();
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for k in frontier {
                if out.contains(&k) {
                    continue;
                }
                out.push(k);
                next.extend_from_slice(k.parents());
            }
            frontier = next;
        }
        out
    }
}

/// Event kinds exposed by the operator framework.
///
/// Category kinds (`Event`, `Hook`, `Relation`, ...) never appear on a
/// concrete catalog entry; they exist so filters can name whole families.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Root of the hierarchy; every kind specializes it.
    Event,
    /// Anything delivered because the agent ran a hook.
    Hook,
    /// User-invoked action.
    Action,
    /// Framework-internal lifecycle (status collection, commit).
    Lifecycle,

    Install,
    Start,
    Stop,
    Remove,
    ConfigChanged,
    UpdateStatus,
    UpgradeCharm,
    PreSeriesUpgrade,
    PostSeriesUpgrade,
    LeaderElected,
    LeaderSettingsChanged,
    CollectMetrics,

    Relation,
    RelationCreated,
    RelationJoined,
    RelationChanged,
    RelationDeparted,
    RelationBroken,

    Storage,
    StorageAttached,
    StorageDetaching,

    Workload,
    PebbleReady,
    PebbleNotice,
    PebbleCustomNotice,
    PebbleCheck,
    PebbleCheckFailed,
    PebbleCheckRecovered,

    Secret,
    SecretChanged,
    SecretExpired,
    SecretRemove,
    SecretRotate,

    CollectStatus,
    PreCommit,
    Commit,
}

impl EventKind {
    /// Every kind, roots first.
    pub const ALL: [Self; 40] = [
        Self::Event,
        Self::Hook,
        Self::Action,
        Self::Lifecycle,
        Self::Install,
        Self::Start,
        Self::Stop,
        Self::Remove,
        Self::ConfigChanged,
        Self::UpdateStatus,
        Self::UpgradeCharm,
        Self::PreSeriesUpgrade,
        Self::PostSeriesUpgrade,
        Self::LeaderElected,
        Self::LeaderSettingsChanged,
        Self::CollectMetrics,
        Self::Relation,
        Self::RelationCreated,
        Self::RelationJoined,
        Self::RelationChanged,
        Self::RelationDeparted,
        Self::RelationBroken,
        Self::Storage,
        Self::StorageAttached,
        Self::StorageDetaching,
        Self::Workload,
        Self::PebbleReady,
        Self::PebbleNotice,
        Self::PebbleCustomNotice,
        Self::PebbleCheck,
        Self::PebbleCheckFailed,
        Self::PebbleCheckRecovered,
        Self::Secret,
        Self::SecretChanged,
        Self::SecretExpired,
        Self::SecretRemove,
        Self::SecretRotate,
        Self::CollectStatus,
        Self::PreCommit,
        Self::Commit,
    ];

    /// Snake-case name, identical to the serde representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Hook => "hook",
            Self::Action => "action",
            Self::Lifecycle => "lifecycle",
            Self::Install => "install",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Remove => "remove",
            Self::ConfigChanged => "config_changed",
            Self::UpdateStatus => "update_status",
            Self::UpgradeCharm => "upgrade_charm",
            Self::PreSeriesUpgrade => "pre_series_upgrade",
            Self::PostSeriesUpgrade => "post_series_upgrade",
            Self::LeaderElected => "leader_elected",
            Self::LeaderSettingsChanged => "leader_settings_changed",
            Self::CollectMetrics => "collect_metrics",
            Self::Relation => "relation",
            Self::RelationCreated => "relation_created",
            Self::RelationJoined => "relation_joined",
            Self::RelationChanged => "relation_changed",
            Self::RelationDeparted => "relation_departed",
            Self::RelationBroken => "relation_broken",
            Self::Storage => "storage",
            Self::StorageAttached => "storage_attached",
            Self::StorageDetaching => "storage_detaching",
            Self::Workload => "workload",
            Self::PebbleReady => "pebble_ready",
            Self::PebbleNotice => "pebble_notice",
            Self::PebbleCustomNotice => "pebble_custom_notice",
            Self::PebbleCheck => "pebble_check",
            Self::PebbleCheckFailed => "pebble_check_failed",
            Self::PebbleCheckRecovered => "pebble_check_recovered",
            Self::Secret => "secret",
            Self::SecretChanged => "secret_changed",
            Self::SecretExpired => "secret_expired",
            Self::SecretRemove => "secret_remove",
            Self::SecretRotate => "secret_rotate",
            Self::CollectStatus => "collect_status",
            Self::PreCommit => "pre_commit",
            Self::Commit => "commit",
        }
    }

    /// True for category kinds that only exist to group other kinds.
    #[must_use]
    pub const fn is_abstract(self) -> bool {
        matches!(
            self,
            Self::Event
                | Self::Hook
                | Self::Lifecycle
                | Self::Relation
                | Self::Storage
                | Self::Workload
                | Self::PebbleNotice
                | Self::PebbleCheck
                | Self::Secret
        )
    }
}

impl Kind for EventKind {
    fn parents(self) -> &'static [Self] {
        match self {
            Self::Event => &[],
            Self::Hook | Self::Action | Self::Lifecycle => &[Self::Event],

            Self::Install
            | Self::Start
            | Self::Stop
            | Self::Remove
            | Self::ConfigChanged
            | Self::UpdateStatus
            | Self::UpgradeCharm
            | Self::PreSeriesUpgrade
            | Self::PostSeriesUpgrade
            | Self::LeaderElected
            | Self::LeaderSettingsChanged
            | Self::CollectMetrics
            | Self::Relation
            | Self::Storage
            | Self::Workload
            | Self::Secret => &[Self::Hook],

            Self::RelationCreated
            | Self::RelationJoined
            | Self::RelationChanged
            | Self::RelationDeparted
            | Self::RelationBroken => &[Self::Relation],

            Self::StorageAttached | Self::StorageDetaching => &[Self::Storage],

            Self::PebbleReady | Self::PebbleNotice | Self::PebbleCheck => &[Self::Workload],
            Self::PebbleCustomNotice => &[Self::PebbleNotice],
            Self::PebbleCheckFailed | Self::PebbleCheckRecovered => &[Self::PebbleCheck],

            Self::SecretChanged | Self::SecretExpired | Self::SecretRemove | Self::SecretRotate => {
                &[Self::Secret]
            }

            Self::CollectStatus | Self::PreCommit | Self::Commit => &[Self::Lifecycle],
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ManifestError::UnknownKind {
                name: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_kinds_listed_once() {
        let mut seen: Vec<EventKind> = Vec::new();
        for k in EventKind::ALL {
            assert!(!seen.contains(&k), "{k} listed twice");
            seen.push(k);
        }
        assert_eq!(seen.len(), 40);
    }

    #[test]
    fn every_kind_specializes_event() {
        for k in EventKind::ALL {
            assert!(k.is_specialization_of(EventKind::Event), "{k}");
        }
    }

    #[test]
    fn setup_and_teardown_kinds_are_hooks() {
        for k in [
            EventKind::Install,
            EventKind::Start,
            EventKind::UpgradeCharm,
            EventKind::Stop,
            EventKind::Remove,
        ] {
            assert!(k.is_specialization_of(EventKind::Hook), "{k}");
        }
    }

    #[test]
    fn actions_and_status_collection_are_not_hooks() {
        assert!(!EventKind::Action.is_specialization_of(EventKind::Hook));
        assert!(!EventKind::CollectStatus.is_specialization_of(EventKind::Hook));
        assert!(!EventKind::Commit.is_specialization_of(EventKind::Hook));
        assert!(EventKind::CollectStatus.is_specialization_of(EventKind::Lifecycle));
    }

    #[test]
    fn specialization_is_not_symmetric() {
        assert!(EventKind::RelationChanged.is_specialization_of(EventKind::Relation));
        assert!(!EventKind::Relation.is_specialization_of(EventKind::RelationChanged));
    }

    #[test]
    fn ancestors_nearest_first() {
        assert_eq!(
            EventKind::PebbleCheckRecovered.ancestors(),
            vec![
                EventKind::PebbleCheck,
                EventKind::Workload,
                EventKind::Hook,
                EventKind::Event
            ]
        );
        assert!(EventKind::Event.ancestors().is_empty());
    }

    #[test]
    fn name_matches_serde() {
        for k in EventKind::ALL {
            let json = serde_json::to_string(&k).unwrap();
            assert_eq!(json, format!("\"{}\"", k.as_str()));
            assert_eq!(k.as_str().parse::<EventKind>().unwrap(), k);
        }
    }

    #[test]
    fn parse_unknown_kind() {
        let err = "bogus".parse::<EventKind>().unwrap_err();
        assert!(matches!(err, ManifestError::UnknownKind { name } if name == "bogus"));
    }

    #[test]
    fn parse_agrees_with_serde_on_padding() {
        assert!(" install".parse::<EventKind>().is_err());
        assert!(serde_json::from_str::<EventKind>("\" install\"").is_err());
        assert_eq!("install".parse::<EventKind>().unwrap(), EventKind::Install);
    }

    #[test]
    fn abstract_kinds_have_children() {
        for parent in EventKind::ALL.into_iter().filter(|k| k.is_abstract()) {
            let has_child = EventKind::ALL
                .iter()
                .any(|k| *k != parent && k.parents().contains(&parent));
            assert!(has_child, "{parent}");
        }
    }
}
