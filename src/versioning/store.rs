//! Version store backends.
//!
//! Two realizations of the durable counter: an in-process map for tests
//! and single-process embedding, and a directory-backed store that derives
//! the counter from `v<N>` directories under the output tree. The
//! directory scan on its own is not concurrency-safe; it relies on the
//! allocator's per-key lock to serialize writers.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use parking_lot::Mutex;
use regex::Regex;

use crate::error::{Error, Result};
use crate::versioning::allocator::VersionStore;

/// Matches version directories: `v1`, `v2`, ...
pub(crate) static VERSION_DIR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v(\d+)$").expect("version dir pattern is valid"));

// ─────────────────────────────────────────────────────────────────
// In-Memory Store
// ─────────────────────────────────────────────────────────────────

/// Counter store backed by a process-local map.
pub struct MemoryVersionStore {
    counters: Mutex<HashMap<String, u32>>,
}

impl MemoryVersionStore {
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryVersionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionStore for MemoryVersionStore {
    fn current_max(&self, key: &str) -> Result<u32> {
        Ok(self.counters.lock().get(key).copied().unwrap_or(0))
    }

    fn record(&self, key: &str, version: u32) -> Result<()> {
        let mut counters = self.counters.lock();
        let current = counters.get(key).copied().unwrap_or(0);
        if version <= current {
            return Err(Error::AllocationConflict {
                key: key.to_string(),
                version,
            });
        }
        counters.insert(key.to_string(), version);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────
// Directory Store
// ─────────────────────────────────────────────────────────────────

/// Counter store derived from `<root>/<key>/v<N>` directories.
///
/// Recording a version creates the directory, which both claims the number
/// and gives the packager a place to write artifacts.
pub struct DirVersionStore {
    root: PathBuf,
}

impl DirVersionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to one version directory.
    pub fn version_dir(&self, key: &str, version: u32) -> PathBuf {
        self.root.join(key).join(format!("v{}", version))
    }

    /// Scan a persona directory for the highest `v<N>` entry.
    pub(crate) fn scan_max(persona_dir: &Path) -> Result<u32> {
        if !persona_dir.is_dir() {
            return Ok(0);
        }

        let entries = fs::read_dir(persona_dir).map_err(|e| {
            Error::store_unavailable(
                persona_dir.display().to_string(),
                format!("cannot read persona directory: {}", e),
            )
        })?;

        let mut max = 0;
        for entry in entries {
            let entry = entry.map_err(|e| {
                Error::store_unavailable(
                    persona_dir.display().to_string(),
                    format!("cannot read directory entry: {}", e),
                )
            })?;
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name();
            if let Some(captures) = name.to_str().and_then(|n| VERSION_DIR_PATTERN.captures(n)) {
                if let Ok(version) = captures[1].parse::<u32>() {
                    max = max.max(version);
                }
            }
        }
        Ok(max)
    }
}

impl VersionStore for DirVersionStore {
    fn current_max(&self, key: &str) -> Result<u32> {
        Self::scan_max(&self.root.join(key))
    }

    fn record(&self, key: &str, version: u32) -> Result<()> {
        let persona_dir = self.root.join(key);
        fs::create_dir_all(&persona_dir).map_err(|e| {
            Error::store_unavailable(key, format!("cannot create persona directory: {}", e))
        })?;

        let version_dir = self.version_dir(key, version);
        // create_dir (not create_dir_all) so an existing directory surfaces
        // as a conflict instead of being silently reused
        match fs::create_dir(&version_dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(Error::AllocationConflict {
                    key: key.to_string(),
                    version,
                })
            }
            Err(e) => Err(Error::store_unavailable(
                key,
                format!("cannot create version directory: {}", e),
            )),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versioning::allocator::VersionAllocator;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_counts_from_zero() {
        let store = MemoryVersionStore::new();
        assert_eq!(store.current_max("rebecka").unwrap(), 0);
        store.record("rebecka", 1).unwrap();
        assert_eq!(store.current_max("rebecka").unwrap(), 1);
    }

    #[test]
    fn test_memory_store_rejects_stale_record() {
        let store = MemoryVersionStore::new();
        store.record("rebecka", 2).unwrap();
        let err = store.record("rebecka", 2).unwrap_err();
        assert!(matches!(err, Error::AllocationConflict { .. }));
    }

    #[test]
    fn test_dir_store_empty_root() {
        let tmp = TempDir::new().unwrap();
        let store = DirVersionStore::new(tmp.path());
        assert_eq!(store.current_max("nonexistent").unwrap(), 0);
    }

    #[test]
    fn test_dir_store_record_creates_version_dir() {
        let tmp = TempDir::new().unwrap();
        let store = DirVersionStore::new(tmp.path());

        store.record("rebecka", 1).unwrap();
        assert!(tmp.path().join("rebecka").join("v1").is_dir());
        assert_eq!(store.current_max("rebecka").unwrap(), 1);

        store.record("rebecka", 2).unwrap();
        assert_eq!(store.current_max("rebecka").unwrap(), 2);
    }

    #[test]
    fn test_dir_store_ignores_non_version_entries() {
        let tmp = TempDir::new().unwrap();
        let persona_dir = tmp.path().join("rebecka");
        fs::create_dir_all(persona_dir.join("v3")).unwrap();
        fs::create_dir_all(persona_dir.join("drafts")).unwrap();
        fs::create_dir_all(persona_dir.join("v")).unwrap();
        fs::write(persona_dir.join("v9"), "a file, not a directory").unwrap();

        let store = DirVersionStore::new(tmp.path());
        assert_eq!(store.current_max("rebecka").unwrap(), 3);
    }

    #[test]
    fn test_dir_store_conflict_on_existing_version() {
        let tmp = TempDir::new().unwrap();
        let store = DirVersionStore::new(tmp.path());
        store.record("rebecka", 1).unwrap();

        let err = store.record("rebecka", 1).unwrap_err();
        assert!(matches!(err, Error::AllocationConflict { .. }));
    }

    #[test]
    fn test_dir_store_behind_allocator() {
        let tmp = TempDir::new().unwrap();
        let allocator = VersionAllocator::new(DirVersionStore::new(tmp.path()));

        assert_eq!(allocator.allocate_next("rebecka").unwrap(), 1);
        assert_eq!(allocator.allocate_next("rebecka").unwrap(), 2);
        assert_eq!(allocator.allocate_next("daniel").unwrap(), 1);

        assert!(tmp.path().join("rebecka").join("v2").is_dir());
        assert!(tmp.path().join("daniel").join("v1").is_dir());
    }
}
