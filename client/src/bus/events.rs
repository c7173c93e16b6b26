//! Application events carried over the bus, one typed payload per event.

use super::BusEvent;
use crate::net::types::{GameRoom, TruthOrDare};

/// Cross-component notifications.
#[derive(Clone, Debug, PartialEq)]
pub enum AppEvent {
    /// A character was unlocked for the current user.
    CharacterUnlocked { character_id: String },
    /// The current user's id or display name changed.
    IdentityChanged { user_id: String, username: String },
    /// The current user joined a werewolf room.
    RoomJoined { room_id: String },
    /// A werewolf game was started.
    GameStarted { room_id: String },
    /// Fresh werewolf room state arrived.
    RoomUpdated(Box<GameRoom>),
    /// A truth-or-dare prompt was generated.
    TruthOrDareGenerated(TruthOrDare),
}

/// Subscription key for [`AppEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AppEventKind {
    CharacterUnlocked,
    IdentityChanged,
    RoomJoined,
    GameStarted,
    RoomUpdated,
    TruthOrDareGenerated,
}

impl BusEvent for AppEvent {
    type Kind = AppEventKind;

    fn kind(&self) -> AppEventKind {
        match self {
            Self::CharacterUnlocked { .. } => AppEventKind::CharacterUnlocked,
            Self::IdentityChanged { .. } => AppEventKind::IdentityChanged,
            Self::RoomJoined { .. } => AppEventKind::RoomJoined,
            Self::GameStarted { .. } => AppEventKind::GameStarted,
            Self::RoomUpdated(_) => AppEventKind::RoomUpdated,
            Self::TruthOrDareGenerated(_) => AppEventKind::TruthOrDareGenerated,
        }
    }
}
