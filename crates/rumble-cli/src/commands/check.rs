//! Implementation of `rumble-schemas check`.

use std::path::PathBuf;
use std::time::Duration;

use rumble::drift::{DriftChecker, DriftConfig, FsArtifactStore};
use rumble::protocol::standard_catalog;
use rumble::RumbleError;

/// Flags for a check run. Unset values keep the [`DriftConfig`] defaults.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub root: PathBuf,
    pub deadline_ms: Option<u64>,
    pub retries: Option<u32>,
    pub strict_orphans: bool,
}

impl CheckOptions {
    fn into_config(self) -> DriftConfig {
        let defaults = DriftConfig::default();
        DriftConfig {
            schema_root: self.root,
            read_retries: self.retries.unwrap_or(defaults.read_retries),
            deadline: self.deadline_ms.map(Duration::from_millis).or(defaults.deadline),
            fail_on_orphans: self.strict_orphans,
            ..defaults
        }
    }
}

/// Prints one line per catalog document and a summary, then returns
/// 0 when everything matches and 1 on drift.
pub async fn run(options: CheckOptions) -> Result<u8, RumbleError> {
    let catalog = standard_catalog()?;
    let config = options.into_config();
    let store = FsArtifactStore::new(&config.schema_root);
    tracing::debug!(root = %config.schema_root.display(), "checking schema artifacts");

    let checker = DriftChecker::new(store, config);
    let report = checker.run(&catalog).await?;
    print!("{}", report.render(true));
    Ok(report.exit_code())
}
