//! Configuration module for the watchlist, credentials and logging
//!
//! This module provides:
//! - Configuration types (`AppConfig`, `TrackedItem`, `ThresholdLevel`)
//! - YAML loading functionality (`load_config`)
//! - Telegram credentials from the environment (`Credentials`)
//! - Runtime tunables with environment variable overrides
//! - Logging configuration (`init_logging`)

pub mod constants;
mod credentials;
mod loader;
pub mod logging;
mod types;

// Re-export types
pub use types::{
    AppConfig, NotificationConfig, QuoteApiConfig, ThresholdLevel, TrackedItem,
    DEFAULT_CHECK_INTERVAL_MINUTES, DEFAULT_QUOTE_API_URL, DEFAULT_VS_CURRENCY,
};

// Re-export loader functions
pub use loader::{apply_env_overrides, load_config, load_config_from_str, CHECK_INTERVAL_ENV};

// Re-export credentials
pub use credentials::{Credentials, CredentialsError, BOT_TOKEN_ENV, CHAT_ID_ENV};

// Re-export logging functions
pub use logging::{init_logging, SanitizedValue};
