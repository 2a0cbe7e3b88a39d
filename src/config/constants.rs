//! Runtime tunables with environment variable overrides
//!
//! Network timeouts and shutdown timing. Watchlist settings live in the
//! YAML configuration instead.

use std::time::Duration;

// =============================================================================
// Configuration file
// =============================================================================

/// Path of the YAML watchlist (default: `config.yaml`)
///
/// Environment variable: `CONFIG_PATH`
pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string())
}

// =============================================================================
// Network
// =============================================================================

/// Quote API request timeout (default: 10 seconds)
///
/// Environment variable: `QUOTE_FETCH_TIMEOUT_SECS`
pub fn quote_fetch_timeout() -> Duration {
    Duration::from_secs(env_or("QUOTE_FETCH_TIMEOUT_SECS", 10))
}

/// Telegram `sendMessage` request timeout (default: 10 seconds)
///
/// Environment variable: `TELEGRAM_SEND_TIMEOUT_SECS`
pub fn telegram_send_timeout() -> Duration {
    Duration::from_secs(env_or("TELEGRAM_SEND_TIMEOUT_SECS", 10))
}

/// Long-poll window passed to `getUpdates` (default: 30 seconds)
///
/// Environment variable: `TELEGRAM_POLL_TIMEOUT_SECS`
pub fn telegram_poll_timeout_secs() -> u64 {
    env_or("TELEGRAM_POLL_TIMEOUT_SECS", 30)
}

/// Pause before polling again after a failed `getUpdates` (default: 5 seconds)
///
/// Environment variable: `COMMAND_RETRY_DELAY_SECS`
pub fn command_retry_delay() -> Duration {
    Duration::from_secs(env_or("COMMAND_RETRY_DELAY_SECS", 5))
}

// =============================================================================
// Shutdown
// =============================================================================

/// How long in-flight work may run after the shutdown signal (default: 5 seconds)
///
/// Environment variable: `SHUTDOWN_GRACE_SECS`
pub fn shutdown_grace_period() -> Duration {
    Duration::from_secs(env_or("SHUTDOWN_GRACE_SECS", 5))
}

fn env_or(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Log all active tunables at startup
pub fn log_configuration() {
    tracing::info!(
        config_path = %config_path(),
        quote_fetch_timeout_secs = quote_fetch_timeout().as_secs(),
        telegram_send_timeout_secs = telegram_send_timeout().as_secs(),
        telegram_poll_timeout_secs = telegram_poll_timeout_secs(),
        command_retry_delay_secs = command_retry_delay().as_secs(),
        shutdown_grace_secs = shutdown_grace_period().as_secs(),
        "Runtime configuration"
    );
}
