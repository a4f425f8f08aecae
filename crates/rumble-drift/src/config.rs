//! Drift check configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Where committed artifacts live unless told otherwise.
pub const DEFAULT_SCHEMA_ROOT: &str = "schemas";

/// Configuration for a drift check run.
#[derive(Debug, Clone)]
pub struct DriftConfig {
    /// Directory the artifacts are committed under.
    pub schema_root: PathBuf,

    /// Extra attempts for a read that fails with a transient error.
    /// 0 means a single attempt.
    pub read_retries: u32,

    /// Pause between read attempts.
    pub retry_backoff: Duration,

    /// Upper bound on the whole check. `None` waits indefinitely.
    pub deadline: Option<Duration>,

    /// Whether unclaimed artifacts fail the check. When `false` they are
    /// still reported.
    pub fail_on_orphans: bool,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            schema_root: PathBuf::from(DEFAULT_SCHEMA_ROOT),
            read_retries: 2,
            retry_backoff: Duration::from_millis(50),
            deadline: Some(Duration::from_secs(30)),
            fail_on_orphans: false,
        }
    }
}
