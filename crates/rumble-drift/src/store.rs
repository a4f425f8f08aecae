//! Artifact storage.
//!
//! The drift checker and regeneration never touch the filesystem directly;
//! they go through an [`ArtifactStore`]. Production uses
//! [`FsArtifactStore`], tests use [`MemoryArtifactStore`].
//!
//! Paths are `/`-separated and relative to the store root, e.g.
//! `client-to-server/input-state-data.json`.

use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::StoreError;

/// Storage for committed schema artifacts.
#[allow(async_fn_in_trait)]
pub trait ArtifactStore: Send + Sync {
    /// Reads an artifact. `Ok(None)` means it does not exist.
    async fn read(&self, path: &str) -> Result<Option<String>, StoreError>;

    /// Creates or replaces an artifact.
    async fn write(&self, path: &str, contents: &str) -> Result<(), StoreError>;

    /// Deletes an artifact. Deleting a missing artifact succeeds.
    async fn remove(&self, path: &str) -> Result<(), StoreError>;

    /// Every artifact path under the root, sorted.
    async fn list(&self) -> Result<Vec<String>, StoreError>;
}

/// Refuses paths that could escape the store root.
///
/// # Errors
/// [`StoreError::InvalidPath`] for empty, absolute, or backslashed paths,
/// and for paths with empty, `.` or `..` segments.
pub fn validate_path(path: &str) -> Result<(), StoreError> {
    let invalid = |reason| {
        Err(StoreError::InvalidPath {
            path: path.to_string(),
            reason,
        })
    };
    if path.is_empty() {
        return invalid("empty path");
    }
    if path.starts_with('/') || path.contains(':') {
        return invalid("absolute path");
    }
    if path.contains('\\') {
        return invalid("backslash separator");
    }
    for segment in path.split('/') {
        match segment {
            "" => return invalid("empty segment"),
            "." | ".." => return invalid("relative segment"),
            _ => {}
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// FsArtifactStore
// ---------------------------------------------------------------------------

/// Artifacts as files under a root directory.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StoreError> {
        validate_path(path)?;
        Ok(path.split('/').fold(self.root.clone(), |dir, segment| dir.join(segment)))
    }
}

fn io_error(path: &str) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_string(),
        source,
    }
}

impl ArtifactStore for FsArtifactStore {
    async fn read(&self, path: &str) -> Result<Option<String>, StoreError> {
        let file = self.resolve(path)?;
        match tokio::fs::read(&file).await {
            // Invalid UTF-8 is content drift, not a read failure.
            Ok(bytes) => Ok(Some(match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
            })),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(path)(err)),
        }
    }

    async fn write(&self, path: &str, contents: &str) -> Result<(), StoreError> {
        let file = self.resolve(path)?;
        if let Some(parent) = file.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_error(path))?;
        }
        // Write beside the target and rename over it so a reader never
        // sees a half-written artifact.
        let staging = file.with_extension("json.tmp");
        tokio::fs::write(&staging, contents).await.map_err(io_error(path))?;
        tokio::fs::rename(&staging, &file).await.map_err(io_error(path))?;
        tracing::debug!(path, bytes = contents.len(), "artifact written");
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        let file = self.resolve(path)?;
        match tokio::fs::remove_file(&file).await {
            Ok(()) => {
                tracing::debug!(path, "artifact removed");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(path)(err)),
        }
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut found = Vec::new();
        let mut pending = vec![(self.root.clone(), String::new())];

        while let Some((dir, prefix)) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(err) if err.kind() == ErrorKind::NotFound => continue,
                Err(err) => return Err(io_error(&prefix)(err)),
            };
            while let Some(entry) = entries.next_entry().await.map_err(io_error(&prefix))? {
                let name = entry.file_name().to_string_lossy().into_owned();
                let relative = if prefix.is_empty() {
                    name
                } else {
                    format!("{prefix}/{name}")
                };
                let file_type = entry.file_type().await.map_err(io_error(&relative))?;
                if file_type.is_dir() {
                    pending.push((entry.path(), relative));
                } else if file_type.is_file() {
                    found.push(relative);
                }
            }
        }

        found.sort();
        Ok(found)
    }
}

// ---------------------------------------------------------------------------
// MemoryArtifactStore
// ---------------------------------------------------------------------------

/// Artifacts in a process-local map.
///
/// Reads can be made to fail a set number of times, and to take a set
/// amount of time, for exercising retries and deadlines.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    artifacts: BTreeMap<String, String>,
    failing_reads: HashMap<String, u32>,
    read_delay: Duration,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current contents of an artifact.
    pub fn get(&self, path: &str) -> Option<String> {
        self.lock().artifacts.get(path).cloned()
    }

    /// Sets an artifact without going through validation.
    pub fn insert(&self, path: impl Into<String>, contents: impl Into<String>) {
        self.lock().artifacts.insert(path.into(), contents.into());
    }

    /// Deletes an artifact.
    pub fn delete(&self, path: &str) -> Option<String> {
        self.lock().artifacts.remove(path)
    }

    pub fn len(&self) -> usize {
        self.lock().artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().artifacts.is_empty()
    }

    /// Makes the next `times` reads of `path` fail with an I/O error.
    pub fn fail_reads(&self, path: impl Into<String>, times: u32) {
        self.lock().failing_reads.insert(path.into(), times);
    }

    /// Makes every read wait `delay` before answering.
    pub fn set_read_delay(&self, delay: Duration) {
        self.lock().read_delay = delay;
    }
}

impl ArtifactStore for MemoryArtifactStore {
    async fn read(&self, path: &str) -> Result<Option<String>, StoreError> {
        validate_path(path)?;
        let delay = self.lock().read_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.lock();
        if let Some(remaining) = inner.failing_reads.get_mut(path) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(StoreError::Io {
                    path: path.to_string(),
                    source: std::io::Error::other("injected read failure"),
                });
            }
        }
        Ok(inner.artifacts.get(path).cloned())
    }

    async fn write(&self, path: &str, contents: &str) -> Result<(), StoreError> {
        validate_path(path)?;
        self.insert(path, contents);
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        validate_path(path)?;
        self.delete(path);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.lock().artifacts.keys().cloned().collect())
    }
}
