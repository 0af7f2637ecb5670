// Key-value storage for widget state.
//
// ⚠️ VERSION BUMP REQUIRED:
// Changes to the on-disk layout of StoreData require incrementing
// STORE_VERSION below.
use crate::context::AppContext;
use anyhow::{Context, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

// Version history:
// - v1: flat string map
const STORE_VERSION: u32 = 1;

/// Wrapper struct for the versioned store file
#[derive(Serialize, Deserialize, Default)]
struct StoreData {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

/// String-keyed storage of string values, the shape widgets persist through.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// All keys in one JSON file, guarded by a sidecar lock file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store located in the context's data directory.
    pub fn open(ctx: &dyn AppContext) -> Result<Self> {
        Ok(Self::new(ctx.get_store_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Helper to get a sidecar lock file path
    fn get_lock_path(file_path: &Path) -> PathBuf {
        let mut lock_path = file_path.to_path_buf();
        if let Some(ext) = lock_path.extension() {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".lock");
            lock_path.set_extension(new_ext);
        } else {
            lock_path.set_extension("lock");
        }
        lock_path
    }

    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = Self::get_lock_path(file_path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file {:?}", lock_path))?;

        file.lock_exclusive()?;
        let result = f();
        file.unlock()?;
        result
    }

    /// Atomic write: Write to .tmp file then rename
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }

    /// Reads the store without locking. A missing file is an empty store; a
    /// corrupt one is an error so that a later write cannot clobber it.
    fn read_unlocked(&self) -> Result<StoreData> {
        if !self.path.exists() {
            return Ok(StoreData {
                version: STORE_VERSION,
                ..StoreData::default()
            });
        }
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read store '{}'", self.path.display()))?;
        let data: StoreData = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse store '{}'", self.path.display()))?;
        if data.version > STORE_VERSION {
            anyhow::bail!(
                "Store '{}' has version {}, newer than supported {}",
                self.path.display(),
                data.version,
                STORE_VERSION
            );
        }
        Ok(data)
    }

    fn modify<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Self::with_lock(&self.path, || {
            let mut data = self.read_unlocked()?;
            f(&mut data.entries);
            data.version = STORE_VERSION;
            let json = serde_json::to_string_pretty(&data)?;
            Self::atomic_write(&self.path, json)
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = Self::with_lock(&self.path, || self.read_unlocked())?;
        Ok(data.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        log::debug!("Writing key '{}' to {}", key, self.path.display());
        self.modify(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        self.modify(|entries| {
            entries.remove(key);
        })
    }
}

/// Process-local store, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}
