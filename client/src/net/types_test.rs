use super::*;

// =============================================================
// Helpers
// =============================================================

fn room_json() -> serde_json::Value {
    serde_json::json!({
        "room_id": "R1",
        "players": [
            { "user_id": "u1", "username": "Alice", "role": "seer", "alive": true, "is_ai": false },
            { "user_id": "ai_1", "username": "森罗", "role": null, "alive": false, "is_ai": true, "died_by": "wolf" },
            { "user_id": "ai_2", "username": "阿黄", "is_ai": true, "guarded": true }
        ],
        "phase": "night",
        "day_count": 1,
        "night_count": 2.0,
        "messages": [{ "role": "host", "content": "天黑请闭眼" }],
        "private_messages": { "u1": [{ "content": "你是预言家" }] },
        "winner": null,
        "night_actions": { "wolf": { "kill": "u1" } },
        "current_night_phase": "wolf"
    })
}

// =============================================================
// Characters
// =============================================================

#[test]
fn character_list_deserializes_backend_shape() {
    let json = serde_json::json!({
        "characters": [{
            "id": "cat",
            "name": "丧彪",
            "animal": "猫",
            "personality": "毒舌",
            "background": "...",
            "skills": ["吐槽"],
            "unlock_condition": "默认解锁",
            "event_id": "event_cat"
        }]
    });
    let list: CharacterList = serde_json::from_value(json).unwrap();
    assert_eq!(list.characters.len(), 1);
    assert_eq!(list.characters[0].id, "cat");
    assert!(!list.characters[0].unlocked);
    assert_eq!(list.characters[0].event_id.as_deref(), Some("event_cat"));
}

#[test]
fn user_characters_tolerates_missing_lists() {
    let chars: UserCharacters = serde_json::from_str("{}").unwrap();
    assert!(chars.unlocked.is_empty());
    assert!(chars.locked.is_empty());
    assert_eq!(chars.unlocked_ids().count(), 0);
}

#[test]
fn unlock_result_defaults_message() {
    let result: UnlockResult = serde_json::from_str(r#"{"success":false}"#).unwrap();
    assert!(!result.success);
    assert_eq!(result.message, "");
}

// =============================================================
// Events
// =============================================================

#[test]
fn mystery_event_progress_counts_found_and_player_clues() {
    let json = serde_json::json!({
        "id": "event_cat",
        "character_id": "cat",
        "title": "消失的小鱼干",
        "background": "...",
        "clues": [
            { "id": "c1", "content": "a", "found": true },
            { "id": "c2", "content": "b" },
            { "id": "c3", "content": "c" },
            { "id": "c4", "content": "d" }
        ],
        "player_clues": ["c2"]
    });
    let event: MysteryEvent = serde_json::from_value(json).unwrap();
    assert!((event.progress() - 0.5).abs() < f64::EPSILON);
}

#[test]
fn mystery_event_without_clues_has_zero_progress() {
    let json = serde_json::json!({ "id": "e", "character_id": "dog", "title": "t", "background": "b" });
    let event: MysteryEvent = serde_json::from_value(json).unwrap();
    assert!(event.progress().abs() < f64::EPSILON);
}

// =============================================================
// Werewolf
// =============================================================

#[test]
fn game_room_deserializes_backend_shape() {
    let room: GameRoom = serde_json::from_value(room_json()).unwrap();
    assert_eq!(room.room_id, "R1");
    assert_eq!(room.phase, GamePhase::Night);
    assert_eq!(room.day_count, 1);
    assert_eq!(room.night_count, 2);
    assert_eq!(room.players.len(), 3);
    assert_eq!(room.player("u1").and_then(|p| p.role), Some(PlayerRole::Seer));
    assert_eq!(room.alive_players().count(), 2);
    assert_eq!(room.ai_count(), 2);
    assert!(!room.is_over());
}

#[test]
fn player_alive_defaults_true() {
    let room: GameRoom = serde_json::from_value(room_json()).unwrap();
    assert!(room.player("ai_2").unwrap().alive);
}

#[test]
fn game_room_rejects_fractional_counts() {
    let mut json = room_json();
    json["day_count"] = serde_json::json!(1.5);
    assert!(serde_json::from_value::<GameRoom>(json).is_err());
}

#[test]
fn game_phase_uses_snake_case() {
    let phase: GamePhase = serde_json::from_str("\"identity_assign\"").unwrap();
    assert_eq!(phase, GamePhase::IdentityAssign);
    assert_eq!(serde_json::to_string(&GamePhase::GameOver).unwrap(), "\"game_over\"");
}

#[test]
fn only_wolf_role_is_wolf() {
    assert!(PlayerRole::Wolf.is_wolf());
    assert!(!PlayerRole::Guard.is_wolf());
}

// =============================================================
// Truth or dare
// =============================================================

#[test]
fn game_result_maps_winner_field() {
    assert_eq!(GameResult::from_winner("wolves"), Some(GameResult::WolvesWin));
    assert_eq!(GameResult::from_winner("villagers"), Some(GameResult::VillagersWin));
    assert_eq!(GameResult::from_winner("nobody"), None);
}

#[test]
fn game_result_parses_wire_names() {
    assert_eq!("wolves_win".parse::<GameResult>(), Ok(GameResult::WolvesWin));
    assert_eq!(GameResult::VillagersWin.as_str(), "villagers_win");
    assert!("draw".parse::<GameResult>().is_err());
}

#[test]
fn truth_or_dare_reads_type_field() {
    let tod: TruthOrDare = serde_json::from_str(r#"{"question":"最尴尬的一件事？","type":"truth_or_dare"}"#).unwrap();
    assert_eq!(tod.kind, "truth_or_dare");
}
