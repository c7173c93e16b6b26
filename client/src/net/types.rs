//! Wire DTOs for the party-game backend's JSON responses.
//!
//! DESIGN
//! ======
//! These types mirror the backend payloads field-for-field. Fields the
//! backend may omit carry `#[serde(default)]`, and unknown fields are
//! ignored so server additions do not break older clients.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::collections::HashMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// WORLD + CHARACTERS
// =============================================================================

/// Intro copy for the landing view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldView {
    pub title: String,
    pub description: String,
    /// Name of the AI host character.
    pub host_ai: String,
    pub intro: String,
}

/// A playable companion character.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// Stable character identifier (e.g. `"cat"`).
    pub id: String,
    pub name: String,
    pub animal: String,
    pub personality: String,
    pub background: String,
    #[serde(default)]
    pub skills: Vec<String>,
    /// Human-readable description of how the character is unlocked.
    pub unlock_condition: String,
    #[serde(default)]
    pub unlocked: bool,
    /// Mystery event tied to this character, if any.
    #[serde(default)]
    pub event_id: Option<String>,
}

/// Response of `GET /characters`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterList {
    pub characters: Vec<Character>,
}

/// Response of `GET /user/{userId}/characters`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCharacters {
    #[serde(default)]
    pub unlocked: Vec<Character>,
    #[serde(default)]
    pub locked: Vec<Character>,
}

impl UserCharacters {
    /// Ids of the unlocked characters, in server order.
    pub fn unlocked_ids(&self) -> impl Iterator<Item = &str> {
        self.unlocked.iter().map(|c| c.id.as_str())
    }
}

/// Response of the unlock endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockResult {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

// =============================================================================
// MYSTERY EVENTS
// =============================================================================

/// One line of a stored conversation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

/// A clue inside a mystery event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventClue {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub found: bool,
}

/// A character's mystery event merged with the user's progress.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MysteryEvent {
    pub id: String,
    pub character_id: String,
    pub title: String,
    pub background: String,
    #[serde(default)]
    pub clues: Vec<EventClue>,
    #[serde(default)]
    pub unlocked: bool,
    #[serde(default)]
    pub completed: bool,
    /// Clue ids the player has already found.
    #[serde(default)]
    pub player_clues: Vec<String>,
    #[serde(default)]
    pub conversation_history: Vec<ChatMessage>,
}

impl MysteryEvent {
    /// Fraction of clues found, in `0.0..=1.0`.
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f64 {
        if self.clues.is_empty() {
            return 0.0;
        }
        let found = self.clues.iter().filter(|c| c.found || self.player_clues.contains(&c.id)).count();
        found as f64 / self.clues.len() as f64
    }
}

/// Response of `GET /user/{userId}/events`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventList {
    #[serde(default)]
    pub events: Vec<MysteryEvent>,
}

// =============================================================================
// WEREWOLF
// =============================================================================

/// Response of `POST /werewolf/room`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomCreated {
    pub room_id: String,
}

/// Response of the join endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinResult {
    pub success: bool,
    #[serde(default)]
    pub room_id: Option<String>,
}

/// Response of the start endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartResult {
    pub success: bool,
}

/// Werewolf game phase as tracked by the server.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    #[default]
    Waiting,
    IdentityAssign,
    Night,
    Day,
    Voting,
    Elimination,
    GameOver,
}

/// Secret role dealt to each player at game start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerRole {
    Wolf,
    Villager,
    Seer,
    Witch,
    Hunter,
    Guard,
}

impl PlayerRole {
    /// Whether this role plays for the wolves.
    pub fn is_wolf(self) -> bool {
        matches!(self, Self::Wolf)
    }
}

/// A seat in a werewolf room.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub user_id: String,
    pub username: String,
    /// Hidden until the game starts (and from other players' views).
    #[serde(default)]
    pub role: Option<PlayerRole>,
    #[serde(default = "default_true")]
    pub alive: bool,
    #[serde(default)]
    pub voted: bool,
    #[serde(default)]
    pub vote_target: Option<String>,
    #[serde(default)]
    pub is_ai: bool,
    /// Cause of death (`"wolf"`, `"vote"`, `"poison"`, `"hunter"`), if dead.
    #[serde(default)]
    pub died_by: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Full werewolf room state, as returned by `GET /werewolf/room/{roomId}`
/// and pushed over the room websocket.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameRoom {
    pub room_id: String,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub phase: GamePhase,
    #[serde(default, deserialize_with = "deserialize_u32_from_number")]
    pub day_count: u32,
    #[serde(default, deserialize_with = "deserialize_u32_from_number")]
    pub night_count: u32,
    /// Public chat and narration.
    #[serde(default)]
    pub messages: Vec<HashMap<String, String>>,
    /// Per-user private messages keyed by user id.
    #[serde(default)]
    pub private_messages: HashMap<String, Vec<HashMap<String, String>>>,
    /// `"wolves"` or `"villagers"` once the game is over.
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default)]
    pub night_actions: HashMap<String, serde_json::Value>,
    /// Current night sub-phase (`guard`, `wolf`, `seer`, `witch`).
    #[serde(default)]
    pub current_night_phase: Option<String>,
    #[serde(default)]
    pub eliminated_tonight: Option<String>,
    #[serde(default)]
    pub saved_tonight: Option<String>,
}

impl GameRoom {
    pub fn player(&self, user_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.user_id == user_id)
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.alive)
    }

    pub fn ai_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_ai).count()
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }
}

// =============================================================================
// TRUTH OR DARE
// =============================================================================

/// Outcome of a werewolf game, used to pick truth vs dare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    WolvesWin,
    VillagersWin,
}

impl GameResult {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WolvesWin => "wolves_win",
            Self::VillagersWin => "villagers_win",
        }
    }

    /// Map a room's `winner` field to a result.
    pub fn from_winner(winner: &str) -> Option<Self> {
        match winner {
            "wolves" => Some(Self::WolvesWin),
            "villagers" => Some(Self::VillagersWin),
            _ => None,
        }
    }
}

impl std::str::FromStr for GameResult {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "wolves_win" => Ok(Self::WolvesWin),
            "villagers_win" => Ok(Self::VillagersWin),
            other => Err(format!("unknown game result '{other}' (expected 'wolves_win' or 'villagers_win')")),
        }
    }
}

/// Generated truth-or-dare prompt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruthOrDare {
    pub question: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

fn deserialize_u32_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Number(number) => {
            if let Some(int) = number.as_u64() {
                return u32::try_from(int).map_err(|_| D::Error::custom(format!("value {int} out of range for u32")));
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            if let Some(float) = number.as_f64()
                && float.is_finite()
                && float.fract() == 0.0
                && (0.0..=f64::from(u32::MAX)).contains(&float)
            {
                return Ok(float as u32);
            }
            Err(D::Error::custom("expected non-negative integer"))
        }
        _ => Err(D::Error::custom("expected number")),
    }
}
