//! Browser `localStorage` backing for the persisted session.
//!
//! SYSTEM CONTEXT
//! ==============
//! Centralizes the csr-only web-sys glue so the session manager can stay
//! platform-agnostic. Native builds see storage as unavailable, which the
//! manager treats like an empty store.

use session::{SessionStore, StoreError};

/// `window.localStorage` as a [`SessionStore`].
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorageStore;

#[cfg(feature = "csr")]
fn local_storage() -> Result<web_sys::Storage, StoreError> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or(StoreError::Unavailable)
}

impl SessionStore for LocalStorageStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        #[cfg(feature = "csr")]
        {
            local_storage()?.get_item(key).map_err(|e| StoreError::Read(format!("{e:?}")))
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = key;
            Err(StoreError::Unavailable)
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        #[cfg(feature = "csr")]
        {
            local_storage()?.set_item(key, value).map_err(|e| StoreError::Write(format!("{e:?}")))
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = (key, value);
            Err(StoreError::Unavailable)
        }
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        #[cfg(feature = "csr")]
        {
            local_storage()?.remove_item(key).map_err(|e| StoreError::Write(format!("{e:?}")))
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = key;
            Err(StoreError::Unavailable)
        }
    }
}
