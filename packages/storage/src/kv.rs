//! Synchronous string key-value stores with a byte quota.
//!
//! These are the substrate of [`crate::LocalBackend`]: fast, never
//! suspending, and small. A write that would push the store past its quota
//! fails with [`StorageError::QuotaExceeded`] and leaves the store untouched.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::{StorageError, StorageResult};

/// Default quota, in the range browsers give local storage
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// String key-value store abstraction
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    fn remove_item(&self, key: &str) -> StorageResult<()>;

    /// All keys, sorted
    fn keys(&self) -> StorageResult<Vec<String>>;

    /// Bytes currently counted against the quota
    fn used_bytes(&self) -> usize;
}

fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

fn total_size(items: &BTreeMap<String, String>) -> usize {
    items.iter().map(|(k, v)| entry_size(k, v)).sum()
}

/// Fails when replacing `key` with `value` would take `items` past `quota`
fn check_quota(
    items: &BTreeMap<String, String>,
    key: &str,
    value: &str,
    quota: usize,
) -> StorageResult<()> {
    let existing = items.get(key).map(|v| entry_size(key, v)).unwrap_or(0);
    let needed = total_size(items) - existing + entry_size(key, value);
    if needed > quota {
        return Err(StorageError::QuotaExceeded {
            needed,
            limit: quota,
        });
    }
    Ok(())
}

fn lock(items: &Mutex<BTreeMap<String, String>>) -> MutexGuard<'_, BTreeMap<String, String>> {
    items.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process store. Clones share the same contents.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    items: Arc<Mutex<BTreeMap<String, String>>>,
    quota: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_quota(DEFAULT_QUOTA_BYTES)
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            items: Arc::new(Mutex::new(BTreeMap::new())),
            quota,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(lock(&self.items).get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut items = lock(&self.items);
        check_quota(&items, key, value, self.quota)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        lock(&self.items).remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(lock(&self.items).keys().cloned().collect())
    }

    fn used_bytes(&self) -> usize {
        total_size(&lock(&self.items))
    }
}

/// Store persisted as a single JSON object file.
///
/// The file is read once on open and rewritten through a temporary file
/// plus rename on every mutation, so a crash leaves either the old or the
/// new contents on disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
    quota: usize,
}

impl FileStore {
    pub fn open(path: impl AsRef<Path>, quota: usize) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();

        let items = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            BTreeMap::new()
        };

        debug!(path = %path.display(), entries = items.len(), "Opened local store");

        Ok(Self {
            path,
            items: Mutex::new(items),
            quota,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, items: &BTreeMap<String, String>) -> StorageResult<()> {
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec(items)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Apply `change` to a copy, persist it, and only then publish it in memory
    fn update(&self, change: impl FnOnce(&mut BTreeMap<String, String>)) -> StorageResult<()> {
        let mut items = lock(&self.items);
        let mut next = items.clone();
        change(&mut next);
        self.persist(&next)?;
        *items = next;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(lock(&self.items).get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        check_quota(&lock(&self.items), key, value, self.quota)?;
        self.update(|items| {
            items.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        if !lock(&self.items).contains_key(key) {
            return Ok(());
        }
        self.update(|items| {
            items.remove(key);
        })
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(lock(&self.items).keys().cloned().collect())
    }

    fn used_bytes(&self) -> usize {
        total_size(&lock(&self.items))
    }
}
