use std::fs;

use tempfile::tempdir;

use reconciler::{
    EventKind, Lifecycle, LifecycleRouter, ManifestError, Phase, PhaseFilters, PhaseRouter,
    Reconcile, ReconcilerError, UnitManifest,
};

#[derive(Debug, Default)]
struct Tally {
    phases: Vec<Phase>,
}

impl Reconcile for Tally {
    type Error = std::io::Error;

    fn reconcile(&mut self) -> Result<(), Self::Error> {
        self.phases.push(Phase::Maintenance);
        Ok(())
    }
}

impl Lifecycle for Tally {
    fn setup(&mut self) -> Result<(), Self::Error> {
        self.phases.push(Phase::Setup);
        Ok(())
    }

    fn teardown(&mut self) -> Result<(), Self::Error> {
        self.phases.push(Phase::Teardown);
        Ok(())
    }
}

#[test]
fn manifest_and_filters_load_from_disk() {
    let dir = tempdir().unwrap();
    let manifest_path = dir.path().join("metadata.json");
    let filters_path = dir.path().join("phases.json");

    fs::write(
        &manifest_path,
        r#"{
            "name": "postgres",
            "peers": {"database-peers": {"interface": "postgresql_peers"}},
            "provides": {"database": {"interface": "postgresql_client"}},
            "storage": {"pgdata": {"type": "filesystem", "location": "/var/lib/pg"}}
        }"#,
    )
    .unwrap();
    fs::write(
        &filters_path,
        r#"{
            "setup": ["install", "storage_attached"],
            "maintenance": ["config_changed", "relation"],
            "teardown": ["storage_detaching", "remove"]
        }"#,
    )
    .unwrap();

    let manifest = UnitManifest::from_path(&manifest_path).unwrap();
    let filters = PhaseFilters::<EventKind>::from_path(&filters_path).unwrap();

    let mut fw = manifest.framework().unwrap();
    let router = LifecycleRouter::with_filters(&mut fw, Tally::default(), &filters);

    fw.emit("pgdata_storage_attached").unwrap();
    fw.emit("database_peers_relation_joined").unwrap();
    fw.emit("start").unwrap();
    fw.emit("pgdata_storage_detaching").unwrap();

    assert_eq!(
        router.unit().phases,
        vec![Phase::Setup, Phase::Maintenance, Phase::Teardown]
    );
}

#[test]
fn missing_manifest_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = UnitManifest::from_path(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(
        err,
        ReconcilerError::Manifest(ManifestError::Io { .. })
    ));
}

#[test]
fn unknown_kind_in_filter_file_is_a_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("phases.json");
    fs::write(
        &path,
        r#"{"setup": ["install"], "maintenance": "*", "teardown": ["explode"]}"#,
    )
    .unwrap();
    let err = PhaseFilters::<EventKind>::from_path(&path).unwrap_err();
    assert!(matches!(
        err,
        ReconcilerError::Manifest(ManifestError::Parse { what: "phase filters", .. })
    ));
}

#[test]
fn default_filters_round_trip_through_json() {
    let json = serde_json::to_string(&PhaseFilters::default()).unwrap();
    let back = PhaseFilters::<EventKind>::from_json(&json).unwrap();
    assert_eq!(back, PhaseFilters::default());
}
