use super::*;

// =============================================================
// Helpers
// =============================================================

fn room(phase: &str) -> WerewolfEvent {
    let raw = serde_json::json!({
        "type": "room_update",
        "room": { "room_id": "R1", "players": [], "phase": phase }
    });
    WerewolfEvent::parse(&raw.to_string()).unwrap()
}

fn error(message: &str) -> WerewolfEvent {
    WerewolfEvent::parse(&serde_json::json!({ "error": message }).to_string()).unwrap()
}

// =============================================================
// WatchState
// =============================================================

#[test]
fn error_before_first_room_is_fatal() {
    let mut watch = WatchState::new(None);
    assert_eq!(watch.observe(&error("房间不存在")), WatchStep::Fatal("房间不存在".to_owned()));
}

#[test]
fn rejected_action_keeps_watching() {
    let mut watch = WatchState::new(None);
    assert_eq!(watch.observe(&room("day")), WatchStep::Continue);
    assert_eq!(watch.observe(&error("当前阶段不允许此操作")), WatchStep::Continue);
    assert_eq!(watch.observe(&room("voting")), WatchStep::Continue);
    assert_eq!(watch.frames, 3);
}

#[test]
fn game_over_ends_watch() {
    let mut watch = WatchState::new(None);
    assert_eq!(watch.observe(&room("night")), WatchStep::Continue);
    assert_eq!(watch.observe(&room("game_over")), WatchStep::Done);
}

#[test]
fn frame_limit_ends_watch() {
    let mut watch = WatchState::new(Some(2));
    assert_eq!(watch.observe(&room("day")), WatchStep::Continue);
    assert_eq!(watch.observe(&error("当前阶段不允许此操作")), WatchStep::Done);
}

// =============================================================
// Cli
// =============================================================

#[test]
fn watch_args_parse() {
    let cli = Cli::try_parse_from(["party-cli", "watch", "R1", "--action", "vote", "--target", "u2", "--frames", "5"]).unwrap();
    let Command::Watch(args) = cli.command else {
        panic!("expected watch");
    };
    assert_eq!(args.room_id, "R1");
    assert_eq!(args.action.as_deref(), Some("vote"));
    assert_eq!(args.target.as_deref(), Some("u2"));
    assert_eq!(args.frames, Some(5));
}
