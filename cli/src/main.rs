#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use party_client::net::socket::{self, ChatReply, ChatRequest, PartySocket, WerewolfEvent, WerewolfRequest};
use party_client::net::types::GameResult;
use party_client::routes::ROUTES;
use party_client::storage::FileStore;
use party_client::{ApiError, ClientConfig, Session, SessionError, StorageError};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("no route matches `{0}`")]
    NoRoute(String),
    #[error("server reported: {0}")]
    Server(String),
}

#[derive(Parser, Debug)]
#[command(name = "party-cli", about = "Beast Party API and websocket CLI")]
struct Cli {
    #[arg(long, env = "PARTY_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "PARTY_STATE_FILE")]
    state_file: Option<PathBuf>,

    #[arg(long, env = "PARTY_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url);
        }
        if let Some(state_file) = &self.state_file {
            config.state_file.clone_from(state_file);
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        config
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the stored identity and unlocked characters.
    Whoami,
    SetName {
        name: String,
    },
    SetUser {
        user_id: String,
    },
    World,
    Characters,
    /// Unlocked/locked characters as the server sees them.
    MyCharacters,
    Unlock {
        character_id: String,
    },
    /// Pull the server's unlocked list into local state.
    Sync,
    Events,
    Answer {
        event_id: String,
        answer1: String,
        answer2: String,
    },
    Room(RoomCommand),
    TruthOrDare {
        game_result: GameResult,
        #[arg(long)]
        players: Option<u32>,
    },
    /// Resolve a UI path against the route table.
    Route {
        path: Option<String>,
    },
    Chat(ChatArgs),
    Watch(WatchArgs),
}

#[derive(Args, Debug)]
struct RoomCommand {
    #[command(subcommand)]
    command: RoomSubcommand,
}

#[derive(Subcommand, Debug)]
enum RoomSubcommand {
    /// Create a room and join it.
    Host,
    Create,
    Join {
        room_id: String,
    },
    Start {
        room_id: String,
    },
    Show {
        room_id: String,
    },
    AddAi {
        room_id: String,
    },
    Fill {
        room_id: String,
        #[arg(long)]
        target_count: Option<u32>,
    },
}

#[derive(Args, Debug)]
struct ChatArgs {
    /// Character id, or event id with `--event`.
    target: String,
    message: String,
    #[arg(long, default_value_t = false)]
    event: bool,
    #[arg(long, default_value_t = 60)]
    wait_secs: u64,
}

#[derive(Args, Debug)]
struct WatchArgs {
    room_id: String,
    /// Speak once after connecting.
    #[arg(long)]
    say: Option<String>,
    /// Perform one action (`vote`, `kill`, `check`, ...) after connecting.
    #[arg(long)]
    action: Option<String>,
    #[arg(long, requires = "action")]
    target: Option<String>,
    #[arg(long, help = "Stop after this many frames")]
    frames: Option<usize>,
    #[arg(long, default_value_t = 300)]
    wait_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = cli.config();
    let storage = FileStore::open(&config.state_file);
    tracing::debug!(base_url = %config.base_url, state_file = %config.state_file.display(), "party-cli starting");
    let mut session = Session::new(config, storage)?;

    run(&mut session, cli.command).await
}

async fn run(session: &mut Session<FileStore>, command: Command) -> Result<(), CliError> {
    match command {
        Command::Whoami => print_identity(session),
        Command::SetName { name } => {
            session.rename(&name)?;
            print_identity(session)
        }
        Command::SetUser { user_id } => {
            session.switch_user(&user_id)?;
            print_identity(session)
        }
        Command::World => print_json(&session.api().get_world_view().await?),
        Command::Characters => print_json(&session.api().get_characters().await?),
        Command::MyCharacters => {
            let user_id = session.identity().user_id().to_owned();
            print_json(&session.api().get_user_characters(&user_id).await?)
        }
        Command::Unlock { character_id } => {
            let result = session.unlock_character(&character_id).await?;
            print_json(&result)
        }
        Command::Sync => {
            let added = session.sync_unlocked().await?;
            eprintln!("synced: {} new", added.len());
            print_identity(session)
        }
        Command::Events => {
            let user_id = session.identity().user_id().to_owned();
            print_json(&session.api().get_user_events(&user_id).await?)
        }
        Command::Answer { event_id, answer1, answer2 } => {
            let user_id = session.identity().user_id().to_owned();
            let result = session
                .api()
                .submit_event_answer(&event_id, &user_id, &answer1, &answer2)
                .await?;
            print_json(&result)
        }
        Command::Room(room) => run_room(session, room).await,
        Command::TruthOrDare { game_result, players } => {
            print_json(&session.truth_or_dare(game_result, players).await?)
        }
        Command::Route { path } => run_route(session, path.as_deref()),
        Command::Chat(args) => run_chat(session, args).await,
        Command::Watch(args) => run_watch(session, args).await,
    }
}

async fn run_room(session: &Session<FileStore>, room: RoomCommand) -> Result<(), CliError> {
    match room.command {
        RoomSubcommand::Host => print_json(&session.host_room().await?),
        RoomSubcommand::Create => print_json(&session.api().create_werewolf_room().await?),
        RoomSubcommand::Join { room_id } => print_json(&session.join_room(&room_id).await?),
        RoomSubcommand::Start { room_id } => print_json(&session.start_game(&room_id).await?),
        RoomSubcommand::Show { room_id } => print_json(&session.refresh_room(&room_id).await?),
        RoomSubcommand::AddAi { room_id } => print_json(&session.api().add_ai_player(&room_id).await?),
        RoomSubcommand::Fill { room_id, target_count } => {
            print_json(&session.api().auto_fill_ai(&room_id, target_count).await?)
        }
    }
}

fn run_route(session: &Session<FileStore>, path: Option<&str>) -> Result<(), CliError> {
    let Some(path) = path else {
        for route in ROUTES {
            println!("{:<22} {:<14} {:?}", route.path, route.name, route.view);
        }
        return Ok(());
    };
    let matched = session
        .routes()
        .resolve(path)
        .ok_or_else(|| CliError::NoRoute(path.to_owned()))?;
    let params: serde_json::Map<String, serde_json::Value> = matched
        .params
        .iter()
        .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
        .collect();
    print_json(&serde_json::json!({
        "name": matched.route.name,
        "view": format!("{:?}", matched.view()),
        "params": params,
    }))
}

async fn run_chat(session: &Session<FileStore>, args: ChatArgs) -> Result<(), CliError> {
    let base_url = &session.config().base_url;
    let user_id = session.identity().user_id();
    let url = if args.event {
        socket::event_chat_url(base_url, user_id, &args.target)?
    } else {
        socket::character_chat_url(base_url, user_id, &args.target)?
    };
    let wait = Duration::from_secs(args.wait_secs);

    let mut channel = PartySocket::connect(&url).await?;
    channel.send(&ChatRequest { message: args.message }).await?;
    loop {
        match channel.next_chat(wait).await? {
            ChatReply::Message { content, character } => {
                match character {
                    Some(name) => println!("{name}: {content}"),
                    None => println!("{content}"),
                }
                break;
            }
            ChatReply::Background { content } => eprintln!("[background] {content}"),
            ChatReply::Error(message) => return Err(CliError::Server(message)),
            ChatReply::Other(value) => eprintln!("[frame] {value}"),
        }
    }
    channel.close().await?;
    Ok(())
}

async fn run_watch(session: &Session<FileStore>, args: WatchArgs) -> Result<(), CliError> {
    let url = socket::werewolf_url(&session.config().base_url, &args.room_id, session.identity().user_id())?;
    let wait = Duration::from_secs(args.wait_secs);
    let mut channel = PartySocket::connect(&url).await?;

    if let Some(action) = args.action {
        channel.send(&WerewolfRequest::Action { action, target: args.target }).await?;
    }
    if let Some(content) = args.say {
        channel.send(&WerewolfRequest::Message { content }).await?;
    }

    let mut watch = WatchState::new(args.frames);
    loop {
        let event = match channel.next_werewolf(wait).await {
            Ok(event) => event,
            Err(ApiError::SocketClosed) => break,
            Err(error) => return Err(error.into()),
        };
        let step = watch.observe(&event);
        match &event {
            WerewolfEvent::RoomState(room) | WerewolfEvent::RoomUpdate(room) => {
                eprintln!(
                    "[room] phase={:?} day={} night={} alive={}/{}",
                    room.phase,
                    room.day_count,
                    room.night_count,
                    room.alive_players().count(),
                    room.players.len()
                );
                if let Some(winner) = &room.winner {
                    println!("winner: {winner}");
                }
            }
            WerewolfEvent::PrivateMessage(content) => println!("[private] {content}"),
            WerewolfEvent::PublicMessage(content) => println!("[public] {content}"),
            WerewolfEvent::Error(message) => eprintln!("[error] {message}"),
            WerewolfEvent::Other(value) => println!("{value}"),
        }
        match step {
            WatchStep::Continue => {}
            WatchStep::Done => break,
            WatchStep::Fatal(message) => return Err(CliError::Server(message)),
        }
    }

    tracing::info!(room_id = %args.room_id, frames = watch.frames, "watch complete");
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum WatchStep {
    Continue,
    Done,
    Fatal(String),
}

/// Decides when a werewolf watch stops.
///
/// An `{"error"}` frame before the first room snapshot means the room does
/// not exist. Later error frames answer a rejected action on a socket that
/// stays open, so the watch keeps reading.
#[derive(Debug)]
struct WatchState {
    room_seen: bool,
    frames: usize,
    limit: Option<usize>,
}

impl WatchState {
    fn new(limit: Option<usize>) -> Self {
        Self { room_seen: false, frames: 0, limit }
    }

    fn observe(&mut self, event: &WerewolfEvent) -> WatchStep {
        self.frames = self.frames.saturating_add(1);
        if let WerewolfEvent::Error(message) = event {
            if !self.room_seen {
                return WatchStep::Fatal(message.clone());
            }
        }
        if let Some(room) = event.room() {
            self.room_seen = true;
            if room.is_over() {
                return WatchStep::Done;
            }
        }
        if self.limit.is_some_and(|limit| self.frames >= limit) {
            return WatchStep::Done;
        }
        WatchStep::Continue
    }
}

fn print_identity(session: &Session<FileStore>) -> Result<(), CliError> {
    let identity = session.identity();
    print_json(&serde_json::json!({
        "user_id": identity.user_id(),
        "username": identity.username(),
        "unlocked_characters": identity.unlocked_characters(),
        "state_file": identity.storage().path(),
    }))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
