//! Drift checking for Rumble's committed schema artifacts.
//!
//! The catalog in `rumble-protocol` is the source of truth; the JSON Schema
//! files under the schema root are what non-Rust peers consume. This crate
//! keeps the two in step:
//!
//! - **Store** ([`ArtifactStore`], [`FsArtifactStore`],
//!   [`MemoryArtifactStore`]): where artifacts are read from and written to.
//! - **Check** ([`DriftChecker`], [`DriftReport`]): which artifacts are
//!   missing, stale, unreadable, or orphaned.
//! - **Regenerate** ([`regenerate`]): rewrite whatever differs.
//!
//! ```text
//! Catalog ──→ DriftChecker ──→ DriftReport ──→ exit code 0 / 1
//!    └──────→ regenerate() ──→ ArtifactStore
//! ```

mod check;
mod config;
mod error;
mod regenerate;
mod report;
mod store;

pub use check::DriftChecker;
pub use config::{DriftConfig, DEFAULT_SCHEMA_ROOT};
pub use error::{DriftError, StoreError};
pub use regenerate::{regenerate, RegenerateSummary};
pub use report::{DriftReport, EntryReport, EntryStatus};
pub use store::{validate_path, ArtifactStore, FsArtifactStore, MemoryArtifactStore};
