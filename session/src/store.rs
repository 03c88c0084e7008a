//! Durable key/value storage for the persisted session.
//!
//! SYSTEM CONTEXT
//! ==============
//! The browser backs this with `localStorage`, the CLI with a JSON file.
//! Only `SessionManager` touches [`TOKEN_KEY`] and [`IDENTITY_KEY`]; the
//! helpers here keep the two keys moving together.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::StoreError;
use crate::types::Identity;

pub const TOKEN_KEY: &str = "screening.token";
pub const IDENTITY_KEY: &str = "screening.identity";

/// String key/value storage that survives process restarts.
pub trait SessionStore {
    /// Read `key`, `Ok(None)` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend rejects the write.
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`; removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend rejects the removal.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-process store. Used by tests and as a non-durable fallback.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `entries`.
    #[must_use]
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let map = entries.into_iter().map(|(k, v)| (k.to_owned(), v.to_owned())).collect();
        Self { entries: Mutex::new(map) }
    }

    /// Current value of `key`, bypassing the trait's error plumbing.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok().and_then(|map| map.get(key).cloned())
    }
}

impl SessionStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let map = self.entries.lock().map_err(|_| StoreError::Unavailable)?;
        Ok(map.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.entries.lock().map_err(|_| StoreError::Unavailable)?;
        map.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut map = self.entries.lock().map_err(|_| StoreError::Unavailable)?;
        map.remove(key);
        Ok(())
    }
}

/// Why a persisted session could not be restored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum Corruption {
    #[error("token present without identity")]
    MissingIdentity,
    #[error("identity present without token")]
    MissingToken,
    #[error("stored token is empty")]
    EmptyToken,
    #[error("stored identity is malformed: {0}")]
    MalformedIdentity(String),
    #[error(transparent)]
    Unreadable(#[from] StoreError),
}

/// Read the persisted pair. `Ok(None)` means nothing was stored.
pub(crate) fn load<S: SessionStore + ?Sized>(store: &S) -> Result<Option<(String, Identity)>, Corruption> {
    let token = store.read(TOKEN_KEY)?;
    let identity = store.read(IDENTITY_KEY)?;
    match (token, identity) {
        (None, None) => Ok(None),
        (Some(_), None) => Err(Corruption::MissingIdentity),
        (None, Some(_)) => Err(Corruption::MissingToken),
        (Some(token), Some(raw)) => {
            if token.trim().is_empty() {
                return Err(Corruption::EmptyToken);
            }
            let identity: Identity =
                serde_json::from_str(&raw).map_err(|e| Corruption::MalformedIdentity(e.to_string()))?;
            Ok(Some((token, identity)))
        }
    }
}

/// Write both keys. If the identity write fails the token is put back to
/// what it held before, so a previous session survives intact.
pub(crate) fn save<S: SessionStore + ?Sized>(store: &S, token: &str, identity: &Identity) -> Result<(), StoreError> {
    let raw = serde_json::to_string(identity).map_err(|e| StoreError::Write(e.to_string()))?;
    let previous_token = store.read(TOKEN_KEY)?;
    store.write(TOKEN_KEY, token)?;
    if let Err(err) = store.write(IDENTITY_KEY, &raw) {
        let rollback = match previous_token {
            Some(previous) => store.write(TOKEN_KEY, &previous),
            None => store.remove(TOKEN_KEY),
        };
        if let Err(rollback_err) = rollback {
            log::error!("failed to roll back {TOKEN_KEY} in session storage: {rollback_err}");
        }
        return Err(err);
    }
    Ok(())
}

/// Remove both keys. Failures are logged; a stale key is caught by `load`.
pub(crate) fn wipe<S: SessionStore + ?Sized>(store: &S) {
    for key in [TOKEN_KEY, IDENTITY_KEY] {
        if let Err(err) = store.remove(key) {
            log::warn!("failed to remove {key} from session storage: {err}");
        }
    }
}
