//! REST client for the party-game backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `Endpoint` variant per backend action. `ApiClient::request` turns an
//! endpoint into a `reqwest` request (method, path under the base URL, query
//! pairs, timeout); `execute` sends it and hands back the response untouched
//! on success. The typed helpers below decode bodies into `types`.
//!
//! ERROR HANDLING
//! ==============
//! Network errors, timeouts, and non-2xx statuses surface as `ApiError`.
//! There is no retry, backoff, or caching at this layer.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use reqwest::{Method, Url};
use serde::de::DeserializeOwned;

use super::types::{
    CharacterList, EventList, GameResult, GameRoom, JoinResult, RoomCreated, StartResult, TruthOrDare, UnlockResult,
    UserCharacters, WorldView,
};
use crate::config::ClientConfig;
use crate::error::ApiError;

/// Seats the backend fills up to when no target is given.
pub const DEFAULT_TARGET_COUNT: u32 = 7;
/// Players assumed for a truth-or-dare prompt when no count is given.
pub const DEFAULT_PLAYER_COUNT: u32 = 2;

// =============================================================================
// ENDPOINTS
// =============================================================================

/// A single backend action with its arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Endpoint<'a> {
    WorldView,
    Characters,
    UserCharacters { user_id: &'a str },
    UnlockCharacter { user_id: &'a str, character_id: &'a str },
    UserEvents { user_id: &'a str },
    SubmitEventAnswer { event_id: &'a str, user_id: &'a str, answer1: &'a str, answer2: &'a str },
    CreateRoom,
    JoinRoom { room_id: &'a str, user_id: &'a str, username: &'a str },
    StartGame { room_id: &'a str },
    Room { room_id: &'a str },
    AddAi { room_id: &'a str },
    AutoFillAi { room_id: &'a str, target_count: u32 },
    TruthOrDare { game_result: GameResult, player_count: u32 },
}

impl Endpoint<'_> {
    pub fn method(&self) -> Method {
        match self {
            Self::WorldView | Self::Characters | Self::UserCharacters { .. } | Self::UserEvents { .. } | Self::Room { .. } => {
                Method::GET
            }
            Self::UnlockCharacter { .. }
            | Self::SubmitEventAnswer { .. }
            | Self::CreateRoom
            | Self::JoinRoom { .. }
            | Self::StartGame { .. }
            | Self::AddAi { .. }
            | Self::AutoFillAi { .. }
            | Self::TruthOrDare { .. } => Method::POST,
        }
    }

    /// Raw path segments relative to the base URL.
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Self::WorldView => vec!["worldview"],
            Self::Characters => vec!["characters"],
            Self::UserCharacters { user_id } => vec!["user", *user_id, "characters"],
            Self::UnlockCharacter { user_id, character_id } => {
                vec!["user", *user_id, "characters", *character_id, "unlock"]
            }
            Self::UserEvents { user_id } => vec!["user", *user_id, "events"],
            Self::SubmitEventAnswer { event_id, .. } => vec!["event", *event_id, "submit-answer"],
            Self::CreateRoom => vec!["werewolf", "room"],
            Self::JoinRoom { room_id, .. } => vec!["werewolf", "room", *room_id, "join"],
            Self::StartGame { room_id } => vec!["werewolf", "room", *room_id, "start"],
            Self::Room { room_id } => vec!["werewolf", "room", *room_id],
            Self::AddAi { room_id } => vec!["werewolf", "room", *room_id, "add-ai"],
            Self::AutoFillAi { room_id, .. } => vec!["werewolf", "room", *room_id, "auto-fill-ai"],
            Self::TruthOrDare { .. } => vec!["truth-or-dare", "generate"],
        }
    }

    /// Human-readable path, e.g. `/werewolf/room/R1/join`.
    pub fn path(&self) -> String {
        self.segments().iter().fold(String::new(), |mut acc, segment| {
            acc.push('/');
            acc.push_str(segment);
            acc
        })
    }

    /// Query-string pairs, in wire order.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::SubmitEventAnswer { user_id, answer1, answer2, .. } => vec![
                ("user_id", (*user_id).to_owned()),
                ("answer1", (*answer1).to_owned()),
                ("answer2", (*answer2).to_owned()),
            ],
            Self::JoinRoom { user_id, username, .. } => {
                vec![("user_id", (*user_id).to_owned()), ("username", (*username).to_owned())]
            }
            Self::AutoFillAi { target_count, .. } => vec![("target_count", target_count.to_string())],
            Self::TruthOrDare { game_result, player_count } => vec![
                ("game_result", game_result.as_str().to_owned()),
                ("player_count", player_count.to_string()),
            ],
            _ => Vec::new(),
        }
    }

    /// Whether the backend is expected to take longer than usual.
    pub fn is_slow(&self) -> bool {
        matches!(self, Self::StartGame { .. })
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// HTTP client bound to one backend base URL.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    start_timeout: Duration,
}

impl ApiClient {
    /// Build a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an absolute `http(s)` URL or
    /// the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url).map_err(|_| ApiError::InvalidBaseUrl(config.base_url.clone()))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(config.base_url.clone()));
        }
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http, base_url, timeout: config.timeout, start_timeout: config.start_timeout })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for `endpoint`, without its query string. Segments are
    /// percent-encoded.
    pub fn url(&self, endpoint: &Endpoint<'_>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(endpoint.segments());
        }
        url
    }

    pub fn timeout_for(&self, endpoint: &Endpoint<'_>) -> Duration {
        if endpoint.is_slow() { self.start_timeout } else { self.timeout }
    }

    /// Prepare the request for `endpoint` without sending it.
    pub fn request(&self, endpoint: &Endpoint<'_>) -> reqwest::RequestBuilder {
        let request = self
            .http
            .request(endpoint.method(), self.url(endpoint))
            .timeout(self.timeout_for(endpoint));
        let query = endpoint.query();
        if query.is_empty() { request } else { request.query(&query) }
    }

    /// Send the request for `endpoint`; the response is returned unmodified
    /// when the status is 2xx.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, timeout, or a non-2xx status.
    pub async fn execute(&self, endpoint: &Endpoint<'_>) -> Result<reqwest::Response, ApiError> {
        tracing::debug!(method = %endpoint.method(), path = %endpoint.path(), "api request");
        let response = self.request(endpoint).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), path = %endpoint.path(), "api request rejected");
            return Err(ApiError::Status { status: status.as_u16(), body });
        }
        Ok(response)
    }

    /// Send the request for `endpoint` and decode its JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    pub async fn fetch<T: DeserializeOwned>(&self, endpoint: &Endpoint<'_>) -> Result<T, ApiError> {
        let bytes = self.execute(endpoint).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    // -------------------------------------------------------------------------
    // World + characters
    // -------------------------------------------------------------------------

    /// `GET /worldview`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn get_world_view(&self) -> Result<WorldView, ApiError> {
        self.fetch(&Endpoint::WorldView).await
    }

    /// `GET /characters`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn get_characters(&self) -> Result<CharacterList, ApiError> {
        self.fetch(&Endpoint::Characters).await
    }

    /// `GET /user/{userId}/characters`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn get_user_characters(&self, user_id: &str) -> Result<UserCharacters, ApiError> {
        self.fetch(&Endpoint::UserCharacters { user_id }).await
    }

    /// `POST /user/{userId}/characters/{characterId}/unlock`
    ///
    /// The backend answers 400 when the unlock condition is not met.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn unlock_character(&self, user_id: &str, character_id: &str) -> Result<UnlockResult, ApiError> {
        self.fetch(&Endpoint::UnlockCharacter { user_id, character_id }).await
    }

    // -------------------------------------------------------------------------
    // Mystery events
    // -------------------------------------------------------------------------

    /// `GET /user/{userId}/events`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn get_user_events(&self, user_id: &str) -> Result<EventList, ApiError> {
        self.fetch(&Endpoint::UserEvents { user_id }).await
    }

    /// `POST /event/{eventId}/submit-answer?user_id=&answer1=&answer2=`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn submit_event_answer(
        &self,
        event_id: &str,
        user_id: &str,
        answer1: &str,
        answer2: &str,
    ) -> Result<serde_json::Value, ApiError> {
        self.fetch(&Endpoint::SubmitEventAnswer { event_id, user_id, answer1, answer2 }).await
    }

    // -------------------------------------------------------------------------
    // Werewolf
    // -------------------------------------------------------------------------

    /// `POST /werewolf/room`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn create_werewolf_room(&self) -> Result<RoomCreated, ApiError> {
        self.fetch(&Endpoint::CreateRoom).await
    }

    /// `POST /werewolf/room/{roomId}/join?user_id=&username=`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn join_werewolf_room(&self, room_id: &str, user_id: &str, username: &str) -> Result<JoinResult, ApiError> {
        self.fetch(&Endpoint::JoinRoom { room_id, user_id, username }).await
    }

    /// `POST /werewolf/room/{roomId}/start`, with the extended timeout.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn start_werewolf_game(&self, room_id: &str) -> Result<StartResult, ApiError> {
        self.fetch(&Endpoint::StartGame { room_id }).await
    }

    /// `GET /werewolf/room/{roomId}`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn get_werewolf_room(&self, room_id: &str) -> Result<GameRoom, ApiError> {
        self.fetch(&Endpoint::Room { room_id }).await
    }

    /// `POST /werewolf/room/{roomId}/add-ai`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn add_ai_player(&self, room_id: &str) -> Result<serde_json::Value, ApiError> {
        self.fetch(&Endpoint::AddAi { room_id }).await
    }

    /// `POST /werewolf/room/{roomId}/auto-fill-ai?target_count=`; `None`
    /// fills to [`DEFAULT_TARGET_COUNT`].
    ///
    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn auto_fill_ai(&self, room_id: &str, target_count: Option<u32>) -> Result<serde_json::Value, ApiError> {
        let target_count = target_count.unwrap_or(DEFAULT_TARGET_COUNT);
        self.fetch(&Endpoint::AutoFillAi { room_id, target_count }).await
    }

    // -------------------------------------------------------------------------
    // Truth or dare
    // -------------------------------------------------------------------------

    /// `POST /truth-or-dare/generate?game_result=&player_count=`; `None`
    /// assumes [`DEFAULT_PLAYER_COUNT`].
    ///
    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn generate_truth_or_dare(
        &self,
        game_result: GameResult,
        player_count: Option<u32>,
    ) -> Result<TruthOrDare, ApiError> {
        let player_count = player_count.unwrap_or(DEFAULT_PLAYER_COUNT);
        self.fetch(&Endpoint::TruthOrDare { game_result, player_count }).await
    }
}
