//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:1998/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Starting a werewolf game deals roles and runs AI setup server-side.
pub const DEFAULT_START_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_STATE_FILE: &str = ".party-client.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every REST path is appended to, without a trailing slash.
    pub base_url: String,
    pub timeout: Duration,
    pub start_timeout: Duration,
    /// Where the native identity mirror lives.
    pub state_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            start_timeout: Duration::from_secs(DEFAULT_START_TIMEOUT_SECS),
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
        }
    }
}

impl ClientConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `PARTY_BASE_URL`: default `http://127.0.0.1:1998/api`
    /// - `PARTY_TIMEOUT_SECS`: default 10
    /// - `PARTY_START_TIMEOUT_SECS`: default 30
    /// - `PARTY_STATE_FILE`: default `.party-client.json`
    pub fn from_env() -> Self {
        let base_url = std::env::var("PARTY_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
        Self {
            base_url: normalize_base_url(&base_url),
            timeout: Duration::from_secs(env_parse_u64("PARTY_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)),
            start_timeout: Duration::from_secs(env_parse_u64("PARTY_START_TIMEOUT_SECS", DEFAULT_START_TIMEOUT_SECS)),
            state_file: std::env::var_os("PARTY_STATE_FILE").map_or_else(|| PathBuf::from(DEFAULT_STATE_FILE), PathBuf::from),
        }
    }

    /// Replace the base URL, trimming any trailing slash.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}
