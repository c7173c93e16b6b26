//! Persisted key-value mirror for identity and preference fields.
//!
//! SYSTEM CONTEXT
//! ==============
//! `state::identity` writes through to a `KeyValueStore` on every change and
//! reads it once at load. Natively the mirror is a JSON file; in the browser
//! (`hydrate` on `wasm32`) it is `localStorage` for the current origin.
//!
//! TRADE-OFFS
//! ==========
//! Reads never fail: a missing or unreadable key is `None` and callers supply
//! defaults. Writes are synchronous and unbatched, and a failed write is
//! returned to the caller.

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;

#[cfg(all(feature = "hydrate", target_arch = "wasm32"))]
mod browser;
mod file;

use std::collections::HashMap;

#[cfg(all(feature = "hydrate", target_arch = "wasm32"))]
pub use browser::BrowserStore;
pub use file::FileStore;

use crate::error::StorageError;

/// String-keyed durable storage.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    fn read(&self, key: &str) -> Option<String>;

    /// Durably store `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage rejects the write.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process store. Cloning it snapshots the contents, which is how tests
/// simulate a reload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn read(&self, key: &str) -> Option<String> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }
}
