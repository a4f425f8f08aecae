//! Writing the catalog's artifacts.
//!
//! Regeneration renders with the same function the drift check compares
//! against, so a check run right after a successful regeneration passes.

use std::collections::HashSet;

use rumble_schema::{generate_catalog, Catalog};

use crate::check::find_orphans;
use crate::{ArtifactStore, DriftError};

/// What a regeneration changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegenerateSummary {
    /// Artifacts created or rewritten, in catalog order.
    pub written: Vec<String>,
    /// Artifacts whose stored bytes already matched.
    pub unchanged: usize,
    /// Orphans deleted (only with `prune`).
    pub removed: Vec<String>,
}

impl std::fmt::Display for RegenerateSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} written, {} unchanged, {} removed",
            self.written.len(),
            self.unchanged,
            self.removed.len()
        )
    }
}

/// Writes every artifact whose stored bytes differ from the catalog.
///
/// With `prune`, artifacts no document claims are deleted as well.
///
/// # Errors
/// - [`DriftError::Schema`] if any document fails to render. Nothing is
///   written in that case.
/// - [`DriftError::Store`] if a write, listing, or removal fails. Artifacts
///   written before the failure stay written.
pub async fn regenerate<S: ArtifactStore>(
    catalog: &Catalog,
    store: &S,
    prune: bool,
) -> Result<RegenerateSummary, DriftError> {
    let schemas = generate_catalog(catalog)?;
    let mut summary = RegenerateSummary::default();

    for schema in &schemas {
        let current = match store.read(&schema.path).await {
            Ok(current) => current,
            Err(err) => {
                tracing::debug!(path = %schema.path, error = %err, "unreadable artifact, rewriting");
                None
            }
        };
        if current.as_deref() == Some(schema.render()) {
            summary.unchanged += 1;
            continue;
        }
        store.write(&schema.path, schema.render()).await?;
        tracing::info!(name = %schema.name, path = %schema.path, "schema written");
        summary.written.push(schema.path.clone());
    }

    if prune {
        let claimed: HashSet<&str> = schemas.iter().map(|s| s.path.as_str()).collect();
        for orphan in find_orphans(store, &claimed).await? {
            store.remove(&orphan).await?;
            tracing::info!(path = %orphan, "orphaned schema removed");
            summary.removed.push(orphan);
        }
    }

    tracing::info!(
        written = summary.written.len(),
        unchanged = summary.unchanged,
        removed = summary.removed.len(),
        "regeneration complete"
    );
    Ok(summary)
}
