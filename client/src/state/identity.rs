//! Persisted user identity and unlocked-character set.
//!
//! SYSTEM CONTEXT
//! ==============
//! Views read the current user id/username and unlocked characters from here,
//! and `session` updates it after successful backend calls. The backing
//! `KeyValueStore` is read once in [`IdentityStore::load`] and written through
//! on every change.
//!
//! TRADE-OFFS
//! ==========
//! Setters do not validate their input; an empty user id is stored verbatim
//! and kept for the session, but the next load treats it as absent.
//! Unlocking is append-only and there is no removal.

#[cfg(test)]
#[path = "identity_test.rs"]
mod identity_test;

use crate::error::StorageError;
use crate::storage::KeyValueStore;

pub const USER_ID_KEY: &str = "userId";
pub const USERNAME_KEY: &str = "username";
pub const UNLOCKED_CHARACTERS_KEY: &str = "unlockedCharacters";

/// Username shown before the player picks one.
pub const DEFAULT_USERNAME: &str = "玩家";
/// Character every player starts with.
pub const STARTER_CHARACTER: &str = "cat";

/// Current user identity plus the characters unlocked on this device.
#[derive(Debug)]
pub struct IdentityStore<S> {
    storage: S,
    user_id: String,
    username: String,
    unlocked: Vec<String>,
}

impl<S: KeyValueStore> IdentityStore<S> {
    /// Load identity state from `storage`, falling back to defaults.
    ///
    /// A missing or empty user id is generated as `user_<unix millis>` and
    /// persisted immediately so later loads see the same id. An empty
    /// username loads as [`DEFAULT_USERNAME`].
    ///
    /// # Errors
    ///
    /// Returns an error if persisting a freshly generated user id fails.
    pub fn load(mut storage: S) -> Result<Self, StorageError> {
        let user_id = match storage.read(USER_ID_KEY).filter(|id| !id.is_empty()) {
            Some(id) => id,
            None => {
                let id = generate_user_id();
                storage.write(USER_ID_KEY, &id)?;
                tracing::info!(user_id = %id, "generated new user id");
                id
            }
        };
        let username = storage
            .read(USERNAME_KEY)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_USERNAME.to_owned());
        let unlocked = storage
            .read(UNLOCKED_CHARACTERS_KEY)
            .and_then(|raw| parse_unlocked(&raw))
            .unwrap_or_else(|| vec![STARTER_CHARACTER.to_owned()]);

        Ok(Self { storage, user_id, username, unlocked })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Replace the user id and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write-through fails; the in-memory value is
    /// left unchanged in that case.
    pub fn set_user_id(&mut self, id: impl Into<String>) -> Result<(), StorageError> {
        let id = id.into();
        self.storage.write(USER_ID_KEY, &id)?;
        self.user_id = id;
        Ok(())
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Replace the username and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write-through fails.
    pub fn set_username(&mut self, name: impl Into<String>) -> Result<(), StorageError> {
        let name = name.into();
        self.storage.write(USERNAME_KEY, &name)?;
        self.username = name;
        Ok(())
    }

    pub fn is_unlocked(&self, character_id: &str) -> bool {
        self.unlocked.iter().any(|id| id == character_id)
    }

    /// Unlocked character ids in the order they were unlocked.
    pub fn unlocked_characters(&self) -> &[String] {
        &self.unlocked
    }

    /// Add `character_id` to the unlocked set and persist the whole list.
    ///
    /// Returns `true` if the id was newly added. Adding an id that is already
    /// unlocked is a no-op and performs no write.
    ///
    /// # Errors
    ///
    /// Returns an error if the write-through fails; the id is not added.
    pub fn add_unlocked_character(&mut self, character_id: &str) -> Result<bool, StorageError> {
        if self.is_unlocked(character_id) {
            return Ok(false);
        }
        self.unlocked.push(character_id.to_owned());
        let persisted = serde_json::to_string(&self.unlocked)
            .map_err(StorageError::from)
            .and_then(|raw| self.storage.write(UNLOCKED_CHARACTERS_KEY, &raw));
        if let Err(error) = persisted {
            self.unlocked.pop();
            return Err(error);
        }
        Ok(true)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Give back the backing store, e.g. to reload from it.
    pub fn into_storage(self) -> S {
        self.storage
    }
}

fn parse_unlocked(raw: &str) -> Option<Vec<String>> {
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(list) => {
            let mut unique: Vec<String> = Vec::with_capacity(list.len());
            for id in list {
                if !unique.contains(&id) {
                    unique.push(id);
                }
            }
            Some(unique)
        }
        Err(error) => {
            tracing::warn!(%error, "ignoring malformed unlocked character list");
            None
        }
    }
}

fn generate_user_id() -> String {
    format!("user_{}", now_ms())
}

/// Wall-clock milliseconds from the JS `Date.now()` API.
#[cfg(all(feature = "hydrate", target_arch = "wasm32"))]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn now_ms() -> u128 {
    js_sys::Date::now() as u128
}

#[cfg(not(all(feature = "hydrate", target_arch = "wasm32")))]
fn now_ms() -> u128 {
    use std::time::{SystemTime, UNIX_EPOCH};

    let Ok(duration) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    duration.as_millis()
}
