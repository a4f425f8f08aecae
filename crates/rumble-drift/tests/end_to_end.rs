//! Generate → write → check scenarios over a real slice of the protocol.

use rumble_drift::{
    regenerate, ArtifactStore, DriftChecker, DriftConfig, EntryStatus, FsArtifactStore,
    MemoryArtifactStore,
};
use rumble_protocol::{standard_catalog, InputStateData, Position, Velocity};
use rumble_schema::Catalog;

const INPUT_MESSAGE_PATH: &str = "client-to-server/input-state-message.json";

fn five_document_catalog() -> Catalog {
    Catalog::builder()
        .shared::<Position>()
        .shared::<Velocity>()
        .envelope()
        .entry::<InputStateData>()
        .build()
        .unwrap()
}

fn ok_lines(rendered: &str) -> usize {
    rendered.lines().filter(|l| l.starts_with("ok: ")).count()
}

// =========================================================================
// In-memory store
// =========================================================================

#[tokio::test]
async fn test_generate_then_check_passes_then_missing_fails() {
    let catalog = five_document_catalog();
    let store = MemoryArtifactStore::new();
    regenerate(&catalog, &store, false).await.unwrap();
    assert_eq!(store.len(), 5);

    let checker = DriftChecker::new(store, DriftConfig::default());
    let report = checker.check(&catalog).await.unwrap();
    let rendered = report.render(true);
    assert_eq!(ok_lines(&rendered), 5);
    assert!(rendered.ends_with("schemas in sync (5 checked)\n"));
    assert_eq!(report.exit_code(), 0);

    checker.store().delete(INPUT_MESSAGE_PATH);
    let report = checker.check(&catalog).await.unwrap();
    let rendered = report.render(true);
    assert_eq!(ok_lines(&rendered), 4);
    assert!(rendered.contains(&format!("missing: InputStateMessage ({INPUT_MESSAGE_PATH})")));
    assert!(rendered.contains("rumble-schemas generate"));
    assert_eq!(report.exit_code(), 1);
}

#[tokio::test]
async fn test_one_byte_mutation_is_stale_and_isolated() {
    let catalog = five_document_catalog();
    let store = MemoryArtifactStore::new();
    regenerate(&catalog, &store, false).await.unwrap();

    let path = "common/velocity.json";
    let mut bytes = store.get(path).unwrap().into_bytes();
    let last_brace = bytes.iter().rposition(|b| *b == b'}').unwrap();
    bytes[last_brace] = b']';
    store.insert(path, String::from_utf8(bytes).unwrap());

    let checker = DriftChecker::new(store, DriftConfig::default());
    let report = checker.check(&catalog).await.unwrap();
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].name, "Velocity");
    assert_eq!(failures[0].status, EntryStatus::Stale);
    assert_eq!(
        report.entries.iter().filter(|e| e.status.is_fresh()).count(),
        4
    );
}

#[tokio::test]
async fn test_trailing_newline_is_significant() {
    let catalog = five_document_catalog();
    let store = MemoryArtifactStore::new();
    regenerate(&catalog, &store, false).await.unwrap();

    let path = "common/position.json";
    let trimmed = store.get(path).unwrap().trim_end().to_string();
    store.insert(path, trimmed);

    let checker = DriftChecker::new(store, DriftConfig::default());
    let report = checker.check(&catalog).await.unwrap();
    assert_eq!(report.failures().next().unwrap().status, EntryStatus::Stale);
}

#[tokio::test]
async fn test_check_never_writes() {
    let catalog = five_document_catalog();
    let store = MemoryArtifactStore::new();
    let checker = DriftChecker::new(store, DriftConfig::default());

    let report = checker.check(&catalog).await.unwrap();
    assert_eq!(report.failures().count(), 5);
    assert!(checker.store().is_empty());
}

#[tokio::test]
async fn test_standard_catalog_regenerate_then_check() {
    let catalog = standard_catalog().unwrap();
    let store = MemoryArtifactStore::new();
    let summary = regenerate(&catalog, &store, false).await.unwrap();
    assert_eq!(summary.written.len(), catalog.document_count());

    let checker = DriftChecker::new(store, DriftConfig::default());
    assert!(checker.check(&catalog).await.unwrap().is_clean());
}

// =========================================================================
// Filesystem store
// =========================================================================

#[tokio::test]
async fn test_filesystem_layout_and_check() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = five_document_catalog();
    let store = FsArtifactStore::new(dir.path());
    regenerate(&catalog, &store, false).await.unwrap();

    for path in [
        "common/position.json",
        "common/velocity.json",
        "common/message.json",
        "client-to-server/input-state-data.json",
        INPUT_MESSAGE_PATH,
    ] {
        assert!(dir.path().join(path).is_file(), "{path} not written");
    }

    let config = DriftConfig {
        schema_root: dir.path().to_path_buf(),
        fail_on_orphans: true,
        ..DriftConfig::default()
    };
    let checker = DriftChecker::new(store, config);
    assert!(checker.run(&catalog).await.unwrap().is_clean());

    std::fs::remove_file(dir.path().join(INPUT_MESSAGE_PATH)).unwrap();
    std::fs::write(dir.path().join("common/legacy.json"), "{}\n").unwrap();
    let report = checker.run(&catalog).await.unwrap();
    assert_eq!(report.failures().count(), 1);
    assert_eq!(report.orphans, ["common/legacy.json"]);
    assert_eq!(report.exit_code(), 1);

    regenerate(&catalog, checker.store(), true).await.unwrap();
    assert!(checker.run(&catalog).await.unwrap().is_clean());
    assert_eq!(checker.store().list().await.unwrap().len(), 5);
}
