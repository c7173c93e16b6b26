//! Networking modules for REST + websocket channels.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` handles REST calls, `socket` owns the live channels (native only), and `types`
//! defines the shared wire schema.

pub mod api;
#[cfg(not(target_arch = "wasm32"))]
pub mod socket;
pub mod types;
