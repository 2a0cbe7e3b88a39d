//! Telegram Bot API adapter
//!
//! This module is organized into submodules:
//! - `types` - Bot API request/response types
//! - `client` - HTTP client implementing `Notifier` and `CommandChannel`

mod client;
mod types;

pub use client::{TelegramClient, TELEGRAM_API_URL};
pub use types::{KeyboardButton, ReplyKeyboardMarkup};
