//! Key-value stores backing the keyed cache

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::warn;

/// Minimal key-value store interface so cache hit/miss paths are testable
/// without touching the filesystem
pub trait CacheStore: Send + Sync {
    /// Load the raw contents for a key, `None` when absent or unreadable
    fn load(&self, key: &str) -> Option<String>;

    /// Store the raw contents for a key. Returns `false` on failure;
    /// callers treat a failed save as a no-op.
    fn save(&self, key: &str, contents: &str) -> bool;
}

impl<S: CacheStore + ?Sized> CacheStore for std::sync::Arc<S> {
    fn load(&self, key: &str) -> Option<String> {
        (**self).load(key)
    }

    fn save(&self, key: &str, contents: &str) -> bool {
        (**self).save(key, contents)
    }
}

/// Production store: one `<dir>/<key>.json` file per key
pub struct FileCacheStore {
    dir: PathBuf,
}

impl FileCacheStore {
    #[must_use]
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl CacheStore for FileCacheStore {
    fn load(&self, key: &str) -> Option<String> {
        let path = self.entry_path(key);
        if !path.exists() {
            return None;
        }
        match fs::read_to_string(&path) {
            Ok(contents) => Some(contents),
            Err(e) => {
                warn!("Failed to read cache file {}: {}", path.display(), e);
                None
            }
        }
    }

    fn save(&self, key: &str, contents: &str) -> bool {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            warn!(
                "Failed to create cache directory {}: {}",
                self.dir.display(),
                e
            );
            return false;
        }

        // Write to a temp file first so a reader never observes a torn file
        let path = self.entry_path(key);
        let tmp_path = self.dir.join(format!("{key}.json.tmp"));
        if let Err(e) = fs::write(&tmp_path, contents) {
            warn!("Failed to write cache file {}: {}", tmp_path.display(), e);
            return false;
        }
        if let Err(e) = fs::rename(&tmp_path, &path) {
            warn!("Failed to replace cache file {}: {}", path.display(), e);
            let _ = fs::remove_file(&tmp_path);
            return false;
        }
        true
    }
}

/// In-memory store for tests
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCacheStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCacheStore {
    fn load(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    fn save(&self, key: &str, contents: &str) -> bool {
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(key.to_string(), contents.to_string());
                true
            }
            Err(_) => false,
        }
    }
}
