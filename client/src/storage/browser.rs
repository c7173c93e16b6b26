//! Browser `localStorage` mirror.

use super::KeyValueStore;
use crate::error::StorageError;

/// Mirror backed by the current origin's `localStorage`.
///
/// The handle is looked up on each call so a store built before the window
/// exists still works once it does.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStore;

impl BrowserStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

impl KeyValueStore for BrowserStore {
    fn read(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = Self::storage().ok_or_else(|| StorageError::Browser("localStorage unavailable".to_owned()))?;
        storage
            .set_item(key, value)
            .map_err(|error| StorageError::Browser(format!("{error:?}")))
    }
}
