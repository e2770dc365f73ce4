//! Unit manifests and the event catalog they expand into.
//!
//! A manifest declares a unit's relation endpoints, workload containers,
//! storage and actions. The framework exposes a fixed set of standard hook
//! events plus a family of events per declared item; [`UnitManifest::catalog`]
//! produces exactly that set.
//!
//! Catalog order: standard events, then relations (`requires`, `provides`,
//! `peers`), storage, containers and actions, each group sorted by name.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{ManifestError, ReconcilerError, ReconcilerResult};
use crate::framework::InMemoryFramework;
use crate::kind::EventKind;

const NAME_PATTERN: &str = r"^[a-z][a-z0-9_-]*$";

static NAME_RE: OnceLock<Regex> = OnceLock::new();

fn name_regex() -> ReconcilerResult<&'static Regex> {
    if let Some(re) = NAME_RE.get() {
        return Ok(re);
    }
    let compiled = Regex::new(NAME_PATTERN)
        .map_err(|e| ReconcilerError::internal(format!("invalid name pattern: {e}")))?;
    Ok(NAME_RE.get_or_init(|| compiled))
}

/// Events every unit exposes regardless of its manifest.
const STANDARD_EVENTS: &[(&str, EventKind)] = &[
    ("install", EventKind::Install),
    ("start", EventKind::Start),
    ("stop", EventKind::Stop),
    ("remove", EventKind::Remove),
    ("update_status", EventKind::UpdateStatus),
    ("config_changed", EventKind::ConfigChanged),
    ("upgrade_charm", EventKind::UpgradeCharm),
    ("pre_series_upgrade", EventKind::PreSeriesUpgrade),
    ("post_series_upgrade", EventKind::PostSeriesUpgrade),
    ("leader_elected", EventKind::LeaderElected),
    ("leader_settings_changed", EventKind::LeaderSettingsChanged),
    ("collect_metrics", EventKind::CollectMetrics),
    ("secret_changed", EventKind::SecretChanged),
    ("secret_expired", EventKind::SecretExpired),
    ("secret_rotate", EventKind::SecretRotate),
    ("secret_remove", EventKind::SecretRemove),
    ("collect_app_status", EventKind::CollectStatus),
    ("collect_unit_status", EventKind::CollectStatus),
];

const RELATION_EVENTS: &[(&str, EventKind)] = &[
    ("relation_created", EventKind::RelationCreated),
    ("relation_joined", EventKind::RelationJoined),
    ("relation_changed", EventKind::RelationChanged),
    ("relation_departed", EventKind::RelationDeparted),
    ("relation_broken", EventKind::RelationBroken),
];

const STORAGE_EVENTS: &[(&str, EventKind)] = &[
    ("storage_attached", EventKind::StorageAttached),
    ("storage_detaching", EventKind::StorageDetaching),
];

const WORKLOAD_EVENTS: &[(&str, EventKind)] = &[
    ("pebble_ready", EventKind::PebbleReady),
    ("pebble_custom_notice", EventKind::PebbleCustomNotice),
    ("pebble_check_failed", EventKind::PebbleCheckFailed),
    ("pebble_check_recovered", EventKind::PebbleCheckRecovered),
];

/// A relation endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Interface name spoken over the relation.
    pub interface: String,
    /// Maximum number of related applications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Whether the unit can run without this relation.
    #[serde(default)]
    pub optional: bool,
}

/// A workload container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    /// OCI image resource backing the container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
}

/// A storage declaration.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSpec {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// An action the unit can run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpec {
    /// Human readable summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Declarative description of a unit.
///
/// Unknown keys are ignored so full metadata documents can be loaded as is.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitManifest {
    pub name: String,
    #[serde(default)]
    pub requires: BTreeMap<String, Endpoint>,
    #[serde(default)]
    pub provides: BTreeMap<String, Endpoint>,
    #[serde(default)]
    pub peers: BTreeMap<String, Endpoint>,
    #[serde(default)]
    pub containers: BTreeMap<String, Container>,
    #[serde(default)]
    pub storage: BTreeMap<String, StorageSpec>,
    #[serde(default)]
    pub actions: BTreeMap<String, ActionSpec>,
}

impl UnitManifest {
    /// Manifest with only a name; exposes the standard events.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parses a manifest from JSON.
    pub fn from_json(json: &str) -> ReconcilerResult<Self> {
        serde_json::from_str(json).map_err(|source| {
            ManifestError::Parse {
                what: "unit manifest",
                source,
            }
            .into()
        })
    }

    /// Reads and parses a manifest file.
    pub fn from_path(path: impl AsRef<Path>) -> ReconcilerResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Expands the manifest into the catalog the framework exposes.
    pub fn catalog(&self) -> ReconcilerResult<Catalog<EventKind>> {
        let re = name_regex()?;
        check_name(re, "unit", &self.name)?;

        let mut catalog = Catalog::new();
        for (name, kind) in STANDARD_EVENTS {
            catalog.define(*name, *kind)?;
        }

        let relations = self
            .requires
            .keys()
            .chain(self.provides.keys())
            .chain(self.peers.keys());
        for endpoint in relations {
            let prefix = event_prefix(re, "relation", endpoint)?;
            define_family(&mut catalog, &prefix, RELATION_EVENTS)?;
        }

        for storage in self.storage.keys() {
            let prefix = event_prefix(re, "storage", storage)?;
            define_family(&mut catalog, &prefix, STORAGE_EVENTS)?;
        }

        for container in self.containers.keys() {
            let prefix = event_prefix(re, "container", container)?;
            define_family(&mut catalog, &prefix, WORKLOAD_EVENTS)?;
        }

        for action in self.actions.keys() {
            let prefix = event_prefix(re, "action", action)?;
            catalog.define(format!("{prefix}_action"), EventKind::Action)?;
        }

        Ok(catalog)
    }

    /// In-memory framework exposing this manifest's catalog.
    pub fn framework(&self) -> ReconcilerResult<InMemoryFramework<EventKind>> {
        Ok(InMemoryFramework::new(self.catalog()?))
    }
}

fn check_name(re: &Regex, field: &'static str, name: &str) -> Result<(), ManifestError> {
    if re.is_match(name) {
        Ok(())
    } else {
        Err(ManifestError::InvalidName {
            field,
            name: name.to_string(),
        })
    }
}

// Validated, underscore-normalized event prefix.
fn event_prefix(re: &Regex, field: &'static str, name: &str) -> Result<String, ManifestError> {
    check_name(re, field, name)?;
    Ok(name.replace('-', "_"))
}

fn define_family(
    catalog: &mut Catalog<EventKind>,
    prefix: &str,
    family: &[(&str, EventKind)],
) -> Result<(), ManifestError> {
    for (suffix, kind) in family {
        catalog.define(format!("{prefix}_{suffix}"), *kind)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LUCA: &str = r#"{
        "name": "luca",
        "summary": "ignored",
        "requires": {"bax": {"interface": "bar"}},
        "containers": {"foo": {}},
        "actions": {"foo": {}}
    }"#;

    #[test]
    fn standard_events_only() {
        let catalog = UnitManifest::new("plain").catalog().unwrap();
        assert_eq!(catalog.len(), STANDARD_EVENTS.len());
        assert_eq!(catalog.kind_of("install"), Some(EventKind::Install));
        assert_eq!(
            catalog.kind_of("collect_unit_status"),
            Some(EventKind::CollectStatus)
        );
    }

    #[test]
    fn manifest_expands_families() {
        let catalog = UnitManifest::from_json(LUCA).unwrap().catalog().unwrap();
        assert_eq!(catalog.len(), STANDARD_EVENTS.len() + 5 + 4 + 1);
        assert_eq!(
            catalog.kind_of("bax_relation_broken"),
            Some(EventKind::RelationBroken)
        );
        assert_eq!(catalog.kind_of("foo_pebble_ready"), Some(EventKind::PebbleReady));
        assert_eq!(
            catalog.kind_of("foo_pebble_check_recovered"),
            Some(EventKind::PebbleCheckRecovered)
        );
        assert_eq!(catalog.kind_of("foo_action"), Some(EventKind::Action));
    }

    #[test]
    fn concrete_kinds_only() {
        let catalog = UnitManifest::from_json(LUCA).unwrap().catalog().unwrap();
        assert!(catalog.iter().all(|(_, k)| !k.is_abstract()));
    }

    #[test]
    fn dashes_become_underscores() {
        let mut manifest = UnitManifest::new("db");
        manifest.peers.insert("db-peers".to_string(), Endpoint::default());
        manifest.storage.insert(
            "data".to_string(),
            StorageSpec {
                kind: "filesystem".to_string(),
                location: None,
            },
        );
        let catalog = manifest.catalog().unwrap();
        assert!(catalog.kind_of("db_peers_relation_joined").is_some());
        assert_eq!(
            catalog.kind_of("data_storage_detaching"),
            Some(EventKind::StorageDetaching)
        );
    }

    #[test]
    fn normalized_collision_is_rejected() {
        let mut manifest = UnitManifest::new("db");
        manifest.requires.insert("a-b".to_string(), Endpoint::default());
        manifest.provides.insert("a_b".to_string(), Endpoint::default());
        let err = manifest.catalog().unwrap_err();
        assert!(matches!(
            err,
            ReconcilerError::Manifest(ManifestError::DuplicateEvent { .. })
        ));
    }

    #[test]
    fn invalid_names_are_rejected() {
        let mut manifest = UnitManifest::new("db");
        manifest.containers.insert("Web App".to_string(), Container::default());
        let err = manifest.catalog().unwrap_err();
        assert!(matches!(
            err,
            ReconcilerError::Manifest(ManifestError::InvalidName { field: "container", .. })
        ));

        let err = UnitManifest::new("").catalog().unwrap_err();
        assert!(err.is_manifest());
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        let err = UnitManifest::from_json("{\"requires\": {}}").unwrap_err();
        assert!(matches!(
            err,
            ReconcilerError::Manifest(ManifestError::Parse { what: "unit manifest", .. })
        ));
    }
}
