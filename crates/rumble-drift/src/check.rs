//! The drift checker.
//!
//! ```text
//! Catalog ──generate──→ expected bytes ─┐
//!                                       ├──compare──→ DriftReport
//! ArtifactStore ──read (concurrent)────┘
//! ```
//!
//! Every document is rendered before any artifact is read, so a catalog
//! configuration error never produces a partial report. Reads then run
//! concurrently and the report waits for all of them; one slow or failing
//! read does not hide the state of the others.

use std::collections::HashSet;
use std::time::Duration;

use futures_util::future::join_all;
use rumble_schema::{generate_catalog, CanonicalSchema, Catalog};

use crate::{ArtifactStore, DriftConfig, DriftError, DriftReport, EntryReport, EntryStatus, StoreError};

/// Compares committed artifacts against a catalog.
#[derive(Debug)]
pub struct DriftChecker<S> {
    store: S,
    config: DriftConfig,
}

impl<S: ArtifactStore> DriftChecker<S> {
    pub fn new(store: S, config: DriftConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &DriftConfig {
        &self.config
    }

    /// Checks every catalog document against its committed artifact.
    ///
    /// # Errors
    /// - [`DriftError::Schema`] when the catalog cannot be rendered; no
    ///   artifact is read in that case.
    /// - [`DriftError::Store`] when the orphan scan cannot list the store.
    ///
    /// Per-artifact read failures are not errors; they appear in the report
    /// as [`EntryStatus::Unreadable`].
    pub async fn check(&self, catalog: &Catalog) -> Result<DriftReport, DriftError> {
        let expected = generate_catalog(catalog)?;
        tracing::debug!(documents = expected.len(), "rendered catalog for drift check");

        let reads = expected.iter().map(|schema| self.check_one(schema));
        let entries: Vec<EntryReport> = join_all(reads).await;

        let claimed: HashSet<&str> = expected.iter().map(|s| s.path.as_str()).collect();
        let orphans = find_orphans(&self.store, &claimed).await?;

        let report = DriftReport {
            entries,
            orphans,
            orphans_fail: self.config.fail_on_orphans,
        };
        if report.is_clean() {
            tracing::info!(checked = report.checked(), "schemas in sync");
        } else {
            tracing::warn!(
                checked = report.checked(),
                failed = report.failures().count(),
                orphans = report.orphans.len(),
                "schema drift detected"
            );
        }
        Ok(report)
    }

    /// [`check`](Self::check), bounded by `deadline`.
    ///
    /// # Errors
    /// [`DriftError::DeadlineExceeded`] if the check is still running when
    /// the deadline passes, otherwise as for `check`.
    pub async fn check_with_deadline(
        &self,
        catalog: &Catalog,
        deadline: Duration,
    ) -> Result<DriftReport, DriftError> {
        match tokio::time::timeout(deadline, self.check(catalog)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(?deadline, "drift check deadline exceeded");
                Err(DriftError::DeadlineExceeded(deadline))
            }
        }
    }

    /// Runs the check with the configured deadline, if any.
    ///
    /// # Errors
    /// As for [`check_with_deadline`](Self::check_with_deadline).
    pub async fn run(&self, catalog: &Catalog) -> Result<DriftReport, DriftError> {
        match self.config.deadline {
            Some(deadline) => self.check_with_deadline(catalog, deadline).await,
            None => self.check(catalog).await,
        }
    }

    async fn check_one(&self, schema: &CanonicalSchema) -> EntryReport {
        let status = match self.read_with_retries(&schema.path).await {
            Ok(None) => EntryStatus::Missing,
            Ok(Some(stored)) if stored == schema.render() => EntryStatus::Fresh,
            Ok(Some(_)) => EntryStatus::Stale,
            Err(err) => EntryStatus::Unreadable(err.to_string()),
        };
        if !status.is_fresh() {
            tracing::debug!(name = %schema.name, path = %schema.path, status = status.label(), "artifact drifted");
        }
        EntryReport {
            name: schema.name,
            path: schema.path.clone(),
            status,
        }
    }

    async fn read_with_retries(&self, path: &str) -> Result<Option<String>, StoreError> {
        let mut attempt = 0;
        loop {
            match self.store.read(path).await {
                Ok(found) => return Ok(found),
                Err(err) if err.is_transient() && attempt < self.config.read_retries => {
                    attempt += 1;
                    tracing::debug!(path, attempt, error = %err, "retrying artifact read");
                    tokio::time::sleep(self.config.retry_backoff).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// `.json` artifacts in `store` that are not in `claimed`.
pub(crate) async fn find_orphans<S: ArtifactStore>(
    store: &S,
    claimed: &HashSet<&str>,
) -> Result<Vec<String>, StoreError> {
    Ok(store
        .list()
        .await?
        .into_iter()
        .filter(|path| path.ends_with(".json") && !claimed.contains(path.as_str()))
        .collect())
}

#[cfg(test)]
mod tests {
    use rumble_protocol::Position;
    use rumble_schema::{generate, schema_of, Group, SchemaDocument};

    use super::*;
    use crate::MemoryArtifactStore;

    fn catalog() -> Catalog {
        Catalog::builder()
            .document(SchemaDocument::new(
                "Position",
                Group::Common,
                schema_of::<Position>(),
            ))
            .envelope()
            .build()
            .unwrap()
    }

    fn fast_config() -> DriftConfig {
        DriftConfig {
            retry_backoff: Duration::from_millis(1),
            ..DriftConfig::default()
        }
    }

    fn synced_store(catalog: &Catalog) -> MemoryArtifactStore {
        let store = MemoryArtifactStore::new();
        for document in catalog.documents() {
            let schema = generate(document).unwrap();
            store.insert(schema.path.clone(), schema.render());
        }
        store
    }

    #[tokio::test]
    async fn test_synced_store_is_clean() {
        let catalog = catalog();
        let checker = DriftChecker::new(synced_store(&catalog), fast_config());
        let report = checker.check(&catalog).await.unwrap();
        assert!(report.is_clean());
        assert_eq!(report.checked(), 2);
    }

    #[tokio::test]
    async fn test_transient_failures_within_budget_recover() {
        let catalog = catalog();
        let store = synced_store(&catalog);
        store.fail_reads("common/position.json", 2);
        let checker = DriftChecker::new(store, fast_config());
        assert!(checker.check(&catalog).await.unwrap().is_clean());
    }

    #[tokio::test]
    async fn test_persistent_failure_is_unreadable_not_missing() {
        let catalog = catalog();
        let store = synced_store(&catalog);
        store.fail_reads("common/position.json", 3);
        let checker = DriftChecker::new(store, fast_config());

        let report = checker.check(&catalog).await.unwrap();
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].path, "common/position.json");
        assert!(matches!(failures[0].status, EntryStatus::Unreadable(_)));
        assert_eq!(report.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_orphans_reported() {
        let catalog = catalog();
        let store = synced_store(&catalog);
        store.insert("common/old-position.json", "{}\n");
        store.insert("README.md", "notes");

        let checker = DriftChecker::new(store, fast_config());
        let report = checker.check(&catalog).await.unwrap();
        assert_eq!(report.orphans, ["common/old-position.json"]);
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_deadline_exceeded() {
        let catalog = catalog();
        let store = synced_store(&catalog);
        store.set_read_delay(Duration::from_millis(500));
        let checker = DriftChecker::new(store, fast_config());

        let err = checker
            .check_with_deadline(&catalog, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, DriftError::DeadlineExceeded(_)));
    }
}
