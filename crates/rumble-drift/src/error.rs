//! Error types for artifact storage and drift checking.

use std::time::Duration;

use rumble_schema::SchemaError;

/// Errors raised by an [`ArtifactStore`](crate::ArtifactStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The path is absolute, escapes the root, or is otherwise unusable.
    #[error("invalid artifact path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// The underlying read, write, or listing failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Whether retrying the same operation might succeed.
    ///
    /// Path errors are permanent; I/O errors are assumed to be transient.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

/// Errors that stop a drift check or a regeneration as a whole.
///
/// Drift itself is not an error: it is reported in the
/// [`DriftReport`](crate::DriftReport).
#[derive(Debug, thiserror::Error)]
pub enum DriftError {
    /// The catalog could not be rendered. No artifact was read or written.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The store failed outside a per-entry read (listing, writing).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The check did not finish in time. Nothing was written.
    #[error("drift check did not finish within {0:?}")]
    DeadlineExceeded(Duration),
}
