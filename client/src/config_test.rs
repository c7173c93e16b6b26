use super::*;

/// # Safety
/// Env-mutating tests share one lock so they never interleave.
unsafe fn clear_party_env() {
    unsafe {
        std::env::remove_var("PARTY_BASE_URL");
        std::env::remove_var("PARTY_TIMEOUT_SECS");
        std::env::remove_var("PARTY_START_TIMEOUT_SECS");
        std::env::remove_var("PARTY_STATE_FILE");
    }
}

static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[test]
fn from_env_defaults() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe { clear_party_env() };

    let cfg = ClientConfig::from_env();
    assert_eq!(cfg, ClientConfig::default());
    assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    assert_eq!(cfg.timeout, Duration::from_secs(10));
    assert_eq!(cfg.start_timeout, Duration::from_secs(30));
}

#[test]
fn from_env_parses_overrides() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_party_env();
        std::env::set_var("PARTY_BASE_URL", "https://party.example.test/api/");
        std::env::set_var("PARTY_TIMEOUT_SECS", "5");
        std::env::set_var("PARTY_START_TIMEOUT_SECS", "60");
        std::env::set_var("PARTY_STATE_FILE", "/tmp/party.json");
    }

    let cfg = ClientConfig::from_env();
    assert_eq!(cfg.base_url, "https://party.example.test/api");
    assert_eq!(cfg.timeout, Duration::from_secs(5));
    assert_eq!(cfg.start_timeout, Duration::from_secs(60));
    assert_eq!(cfg.state_file, PathBuf::from("/tmp/party.json"));

    unsafe { clear_party_env() };
}

#[test]
fn from_env_ignores_unparsable_timeouts() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_party_env();
        std::env::set_var("PARTY_TIMEOUT_SECS", "soon");
    }

    let cfg = ClientConfig::from_env();
    assert_eq!(cfg.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));

    unsafe { clear_party_env() };
}

#[test]
fn with_base_url_trims_trailing_slash() {
    let cfg = ClientConfig::default().with_base_url("http://localhost:1998/api//");
    assert_eq!(cfg.base_url, "http://localhost:1998/api");
}
