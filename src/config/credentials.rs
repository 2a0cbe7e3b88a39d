//! Telegram credentials
//!
//! Loads the bot token and the notification chat from environment variables.
//! Both are required; their absence is a fatal startup error.

use thiserror::Error;
use tracing::info;

use super::logging::SanitizedValue;

pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const CHAT_ID_ENV: &str = "TELEGRAM_CHAT_ID";

/// Errors for credential loading
#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Environment variable {0} still contains a placeholder value")]
    Placeholder(String),
}

/// Messaging credentials loaded from environment variables
#[derive(Clone)]
pub struct Credentials {
    /// Bot API token issued by @BotFather
    pub bot_token: String,
    /// Chat receiving threshold notifications
    pub chat_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("bot_token", &SanitizedValue::new(&self.bot_token).to_string())
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl Credentials {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        }
    }

    /// Load credentials from `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID`
    pub fn from_env() -> Result<Self, CredentialsError> {
        let bot_token = required_var(BOT_TOKEN_ENV)?;
        let chat_id = required_var(CHAT_ID_ENV)?;

        info!(
            bot_token = %SanitizedValue::new(&bot_token),
            chat_id = %chat_id,
            "Telegram credentials loaded"
        );

        Ok(Self { bot_token, chat_id })
    }
}

fn required_var(name: &str) -> Result<String, CredentialsError> {
    let value = std::env::var(name)
        .map(|v| v.trim().to_string())
        .unwrap_or_default();

    if value.is_empty() {
        return Err(CredentialsError::MissingEnvVar(name.to_string()));
    }

    if value.starts_with("your_") || value.starts_with("your-") {
        return Err(CredentialsError::Placeholder(name.to_string()));
    }

    Ok(value)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_env() {
        env::remove_var(BOT_TOKEN_ENV);
        env::remove_var(CHAT_ID_ENV);
    }

    #[test]
    #[serial(env)]
    fn test_missing_token_is_error() {
        clear_env();
        env::set_var(CHAT_ID_ENV, "12345");

        let result = Credentials::from_env();
        clear_env();

        match result {
            Err(CredentialsError::MissingEnvVar(name)) => assert_eq!(name, BOT_TOKEN_ENV),
            other => panic!("Expected MissingEnvVar, got {:?}", other),
        }
    }

    #[test]
    #[serial(env)]
    fn test_missing_chat_id_is_error() {
        clear_env();
        env::set_var(BOT_TOKEN_ENV, "123456:ABCDEF");

        let result = Credentials::from_env();
        clear_env();

        assert!(matches!(result, Err(CredentialsError::MissingEnvVar(name)) if name == CHAT_ID_ENV));
    }

    #[test]
    #[serial(env)]
    fn test_placeholder_is_error() {
        clear_env();
        env::set_var(BOT_TOKEN_ENV, "your_bot_token_here");
        env::set_var(CHAT_ID_ENV, "12345");

        let result = Credentials::from_env();
        clear_env();

        assert!(matches!(result, Err(CredentialsError::Placeholder(_))));
    }

    #[test]
    #[serial(env)]
    fn test_loads_credentials() {
        clear_env();
        env::set_var(BOT_TOKEN_ENV, " 123456:ABCDEF ");
        env::set_var(CHAT_ID_ENV, "-100200300");

        let result = Credentials::from_env();
        clear_env();

        let creds = result.unwrap();
        assert_eq!(creds.bot_token, "123456:ABCDEF");
        assert_eq!(creds.chat_id, "-100200300");
    }

    #[test]
    fn test_debug_redacts_token() {
        let creds = Credentials::new("123456789:SECRETSECRET", "42");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("SECRETSECRET"), "Got: {}", debug);
        assert!(debug.contains("REDACTED"));
    }
}
