//! Application session: the explicitly constructed singletons.
//!
//! SYSTEM CONTEXT
//! ==============
//! Built once at startup and handed to whatever needs it. Composite
//! operations call the backend, update the identity store, then publish on
//! the bus, so views never have to coordinate those three themselves.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use crate::bus::{AppEvent, EventBus};
use crate::config::ClientConfig;
use crate::error::SessionError;
use crate::net::api::ApiClient;
use crate::net::types::{GameResult, GameRoom, JoinResult, RoomCreated, StartResult, TruthOrDare, UnlockResult};
use crate::routes::RouteTable;
use crate::state::identity::IdentityStore;
use crate::storage::KeyValueStore;

pub struct Session<S> {
    config: ClientConfig,
    api: ApiClient,
    identity: IdentityStore<S>,
    bus: EventBus<AppEvent>,
    routes: RouteTable,
}

impl<S: KeyValueStore> Session<S> {
    /// Build the session, loading identity from `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or a generated user id
    /// cannot be persisted.
    pub fn new(config: ClientConfig, storage: S) -> Result<Self, SessionError> {
        let api = ApiClient::new(&config)?;
        let identity = IdentityStore::load(storage)?;
        Ok(Self { config, api, identity, bus: EventBus::new(), routes: RouteTable::new() })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn identity(&self) -> &IdentityStore<S> {
        &self.identity
    }

    pub fn bus(&self) -> &EventBus<AppEvent> {
        &self.bus
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    fn identity_changed(&self) {
        self.bus.publish(&AppEvent::IdentityChanged {
            user_id: self.identity.user_id().to_owned(),
            username: self.identity.username().to_owned(),
        });
    }

    /// Change the display name.
    ///
    /// # Errors
    ///
    /// Returns an error if the write-through fails.
    pub fn rename(&mut self, username: &str) -> Result<(), SessionError> {
        self.identity.set_username(username)?;
        self.identity_changed();
        Ok(())
    }

    /// Switch to another user id, e.g. one restored from elsewhere.
    ///
    /// # Errors
    ///
    /// Returns an error if the write-through fails.
    pub fn switch_user(&mut self, user_id: &str) -> Result<(), SessionError> {
        self.identity.set_user_id(user_id)?;
        self.identity_changed();
        Ok(())
    }

    /// Ask the backend to unlock `character_id`; on success record it locally
    /// and publish `CharacterUnlocked`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails (including the backend's 400
    /// for an unmet unlock condition) or the write-through fails.
    pub async fn unlock_character(&mut self, character_id: &str) -> Result<UnlockResult, SessionError> {
        let result = self.api.unlock_character(self.identity.user_id(), character_id).await?;
        if result.success && self.identity.add_unlocked_character(character_id)? {
            self.bus.publish(&AppEvent::CharacterUnlocked { character_id: character_id.to_owned() });
        }
        Ok(result)
    }

    /// Merge the backend's unlocked characters into the local set.
    ///
    /// Returns the ids that were new locally. Nothing is ever removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or a write-through fails.
    pub async fn sync_unlocked(&mut self) -> Result<Vec<String>, SessionError> {
        let remote = self.api.get_user_characters(self.identity.user_id()).await?;
        let mut added = Vec::new();
        for id in remote.unlocked_ids() {
            if self.identity.add_unlocked_character(id)? {
                added.push(id.to_owned());
            }
        }
        for id in &added {
            self.bus.publish(&AppEvent::CharacterUnlocked { character_id: id.clone() });
        }
        tracing::debug!(added = added.len(), "unlocked characters synced");
        Ok(added)
    }

    /// Create a room and join it as the current user.
    ///
    /// # Errors
    ///
    /// Returns an error if either request fails.
    pub async fn host_room(&self) -> Result<RoomCreated, SessionError> {
        let created = self.api.create_werewolf_room().await?;
        self.join_room(&created.room_id).await?;
        Ok(created)
    }

    /// Join `room_id` with the stored identity and publish `RoomJoined`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn join_room(&self, room_id: &str) -> Result<JoinResult, SessionError> {
        let joined = self
            .api
            .join_werewolf_room(room_id, self.identity.user_id(), self.identity.username())
            .await?;
        if joined.success {
            self.bus.publish(&AppEvent::RoomJoined { room_id: room_id.to_owned() });
        }
        Ok(joined)
    }

    /// Start the game in `room_id` and publish `GameStarted`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or times out.
    pub async fn start_game(&self, room_id: &str) -> Result<StartResult, SessionError> {
        let started = self.api.start_werewolf_game(room_id).await?;
        if started.success {
            self.bus.publish(&AppEvent::GameStarted { room_id: room_id.to_owned() });
        }
        Ok(started)
    }

    /// Fetch `room_id` and publish it as `RoomUpdated`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn refresh_room(&self, room_id: &str) -> Result<GameRoom, SessionError> {
        let room = self.api.get_werewolf_room(room_id).await?;
        self.bus.publish(&AppEvent::RoomUpdated(Box::new(room.clone())));
        Ok(room)
    }

    /// Generate a truth-or-dare prompt and publish it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn truth_or_dare(&self, result: GameResult, player_count: Option<u32>) -> Result<TruthOrDare, SessionError> {
        let prompt = self.api.generate_truth_or_dare(result, player_count).await?;
        self.bus.publish(&AppEvent::TruthOrDareGenerated(prompt.clone()));
        Ok(prompt)
    }
}
