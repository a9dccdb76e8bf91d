//! services/client/src/adapters/mirror.rs
//!
//! Implementations of the `MirrorStorage` port: an in-memory map for tests and
//! short-lived processes, and a directory of JSON files that survives restarts.
//! Also holds the typed helpers for the two mirrored keys.

use quiz_core::domain::Identity;
use quiz_core::ports::{MirrorStorage, PortError, PortResult};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::adapters::wire::{TestResultRecord, UserRecord};

/// The identity mirrored after a fallback sign-in.
pub const DEV_USER_KEY: &str = "dev-user";
/// Test results saved while the test service was unreachable, newest first.
pub const DEV_HISTORY_KEY: &str = "dev-test-history";

//=========================================================================================
// In-Memory Mirror
//=========================================================================================

#[derive(Debug, Default)]
pub struct MemoryMirror {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> PortResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| PortError::Storage("mirror lock poisoned".to_string()))
    }
}

impl MirrorStorage for MemoryMirror {
    fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> PortResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

//=========================================================================================
// File-Backed Mirror
//=========================================================================================

/// One `<key>.json` file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileMirror {
    dir: PathBuf,
}

impl FileMirror {
    /// Creates the directory if it does not exist yet.
    pub fn open(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PortResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(PortError::Storage(format!("invalid mirror key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl MirrorStorage for FileMirror {
    fn get(&self, key: &str) -> PortResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PortError::Storage(e.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| PortError::Storage(e.to_string()))?;
        fs::rename(&tmp, &path).map_err(|e| PortError::Storage(e.to_string()))
    }

    fn remove(&self, key: &str) -> PortResult<()> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortError::Storage(e.to_string())),
        }
    }
}

//=========================================================================================
// Typed Access to the Mirrored Keys
//=========================================================================================

pub fn read_identity(mirror: &dyn MirrorStorage) -> PortResult<Option<Identity>> {
    let Some(raw) = mirror.get(DEV_USER_KEY)? else {
        return Ok(None);
    };
    let record: UserRecord =
        serde_json::from_str(&raw).map_err(|e| PortError::Storage(e.to_string()))?;
    Ok(Some(record.to_domain()))
}

pub fn write_identity(mirror: &dyn MirrorStorage, identity: &Identity) -> PortResult<()> {
    let raw = serde_json::to_string(&UserRecord::from_domain(identity))
        .map_err(|e| PortError::Storage(e.to_string()))?;
    mirror.set(DEV_USER_KEY, &raw)
}

/// The mirrored history list. A missing key reads as empty.
pub fn read_history(mirror: &dyn MirrorStorage) -> PortResult<Vec<TestResultRecord>> {
    match mirror.get(DEV_HISTORY_KEY)? {
        Some(raw) => serde_json::from_str(&raw).map_err(|e| PortError::Storage(e.to_string())),
        None => Ok(Vec::new()),
    }
}

pub fn write_history(mirror: &dyn MirrorStorage, history: &[TestResultRecord]) -> PortResult<()> {
    let raw = serde_json::to_string(history).map_err(|e| PortError::Storage(e.to_string()))?;
    mirror.set(DEV_HISTORY_KEY, &raw)
}

pub fn clear_mirrors(mirror: &dyn MirrorStorage) -> PortResult<()> {
    mirror.remove(DEV_USER_KEY)?;
    mirror.remove(DEV_HISTORY_KEY)
}
