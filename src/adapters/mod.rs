//! Adapters for the quote API and the messaging API
//!
//! This module provides the traits the core depends on and their
//! HTTP implementations (CoinGecko quotes, Telegram messaging).

pub mod coingecko;
pub mod errors;
pub mod telegram;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use coingecko::CoinGeckoClient;
pub use errors::{NotifyError, NotifyResult, QuoteError, QuoteResult};
pub use telegram::{ReplyKeyboardMarkup, TelegramClient};
pub use traits::{CommandChannel, Notifier, QuoteSource};
pub use types::{InboundMessage, ObservationBatch, OutboundMessage, ParseMode};
