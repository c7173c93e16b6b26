//! # party-client
//!
//! Client layer for the Beast Party social game: a REST client for the
//! backend, websocket channels for live werewolf rooms and character chat,
//! the persisted identity/unlock store, an in-process event bus, and the
//! route table the UI mounts views from.
//!
//! Natively the identity mirror is a JSON file; with the `hydrate` feature on
//! `wasm32` it is the browser's `localStorage`. Websocket channels are only
//! built for native targets.

pub mod bus;
pub mod config;
pub mod error;
pub mod net;
pub mod routes;
pub mod session;
pub mod state;
pub mod storage;

pub use config::ClientConfig;
pub use error::{ApiError, SessionError, StorageError};
pub use session::Session;
