//! File-backed session store for the CLI.
//!
//! The session survives between invocations as a flat JSON object of
//! string keys to string values. Writes go to a sibling temp file first and
//! are renamed into place, so a crash never leaves a half-written file. An
//! unparsable file reads as empty and is replaced on the next write.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use session::{SessionStore, StoreError};

type Entries = BTreeMap<String, String>;

/// [`SessionStore`] persisted at a single JSON file path.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Entries, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(Entries::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unparsable session file");
                Entries::new()
            })),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(StoreError::Read(format!("{}: {e}", self.path.display()))),
        }
    }

    fn save(&self, entries: &Entries) -> Result<(), StoreError> {
        let write_err = |e: &dyn std::fmt::Display| StoreError::Write(format!("{}: {e}", self.path.display()));
        if entries.is_empty() {
            return match fs::remove_file(&self.path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(write_err(&e)),
                _ => Ok(()),
            };
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| write_err(&e))?;
        }
        let raw = serde_json::to_string_pretty(entries).map_err(|e| write_err(&e))?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, raw).map_err(|e| write_err(&e))?;
        fs::rename(&staging, &self.path).map_err(|e| write_err(&e))?;
        tracing::debug!(path = %self.path.display(), "session file written");
        Ok(())
    }

    fn modify(&self, change: impl FnOnce(&mut Entries)) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut entries = self.load()?;
        change(&mut entries);
        self.save(&entries)
    }
}

impl SessionStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(self.load()?.remove(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.modify(|entries| {
            entries.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.modify(|entries| {
            entries.remove(key);
        })
    }
}
