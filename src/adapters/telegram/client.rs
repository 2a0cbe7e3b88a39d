//! Telegram Bot API client
//!
//! Implements [`Notifier`] through `sendMessage` and [`CommandChannel`]
//! through `getUpdates` long polling.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::adapters::errors::{NotifyError, NotifyResult};
use crate::adapters::traits::{CommandChannel, Notifier};
use crate::adapters::types::{InboundMessage, OutboundMessage, ParseMode};
use crate::config::{Credentials, SanitizedValue};

use super::types::{ApiResponse, GetUpdatesRequest, ReplyKeyboardMarkup, SendMessageRequest, Update};

/// Production Bot API host
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Extra time allowed on top of the long-poll window before the request times out
const POLL_GRACE_SECS: u64 = 10;

pub struct TelegramClient {
    http: Client,
    /// `{host}/bot{token}`
    endpoint: String,
    /// Next `getUpdates` offset (last seen update_id + 1)
    offset: AtomicI64,
    poll_timeout_secs: u64,
    reply_keyboard: Option<ReplyKeyboardMarkup>,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("endpoint", &SanitizedValue::new(&self.endpoint))
            .field("offset", &self.offset.load(Ordering::Relaxed))
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}

impl TelegramClient {
    /// Build a client against the production Bot API
    pub fn new(
        credentials: &Credentials,
        send_timeout: Duration,
        poll_timeout_secs: u64,
    ) -> NotifyResult<Self> {
        Self::with_api_url(TELEGRAM_API_URL, credentials, send_timeout, poll_timeout_secs)
    }

    /// Build a client against an arbitrary host (used by tests)
    pub fn with_api_url(
        api_url: &str,
        credentials: &Credentials,
        send_timeout: Duration,
        poll_timeout_secs: u64,
    ) -> NotifyResult<Self> {
        let http = Client::builder()
            .timeout(send_timeout)
            .build()
            .map_err(|e| NotifyError::Http(e.without_url()))?;

        Ok(Self {
            http,
            endpoint: format!("{}/bot{}", api_url.trim_end_matches('/'), credentials.bot_token),
            offset: AtomicI64::new(0),
            poll_timeout_secs,
            reply_keyboard: None,
        })
    }

    /// Attach a keyboard to every command reply
    pub fn with_reply_keyboard(mut self, keyboard: ReplyKeyboardMarkup) -> Self {
        self.reply_keyboard = Some(keyboard);
        self
    }

    pub fn current_offset(&self) -> i64 {
        self.offset.load(Ordering::Relaxed)
    }

    /// `sendMessage`, optionally with the reply keyboard
    pub async fn send_message(
        &self,
        chat_id: &str,
        message: &OutboundMessage,
        with_keyboard: bool,
    ) -> NotifyResult<()> {
        let request = SendMessageRequest {
            chat_id,
            text: &message.text,
            parse_mode: match message.parse_mode {
                ParseMode::Html => Some("HTML"),
                ParseMode::Plain => None,
            },
            reply_markup: if with_keyboard {
                self.reply_keyboard.as_ref()
            } else {
                None
            },
        };

        let _: serde_json::Value = self.call("sendMessage", &request, None).await?;
        debug!(chat_id = %chat_id, chars = message.text.chars().count(), "Telegram message sent");
        Ok(())
    }

    /// One `getUpdates` long poll; advances the offset past returned updates
    pub async fn get_updates(&self) -> NotifyResult<Vec<InboundMessage>> {
        let request = GetUpdatesRequest {
            offset: self.current_offset(),
            timeout: self.poll_timeout_secs,
            allowed_updates: vec!["message"],
        };
        let window = Duration::from_secs(self.poll_timeout_secs + POLL_GRACE_SECS);

        let updates: Vec<Update> = self.call("getUpdates", &request, Some(window)).await?;

        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            self.offset.store(last + 1, Ordering::Relaxed);
        }

        let messages: Vec<InboundMessage> = updates
            .into_iter()
            .filter_map(|update| update.message)
            .filter_map(|message| {
                message.text.map(|text| InboundMessage {
                    chat_id: message.chat.id.to_string(),
                    text,
                })
            })
            .collect();

        if !messages.is_empty() {
            info!(count = messages.len(), "Telegram messages received");
        }
        Ok(messages)
    }

    async fn call<B, T>(&self, method: &str, body: &B, timeout: Option<Duration>) -> NotifyResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.endpoint, method);
        let mut request = self.http.post(&url).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        // Strip the URL from transport errors: it embeds the bot token
        let response = request.send().await.map_err(|e| NotifyError::Http(e.without_url()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| NotifyError::Http(e.without_url()))?;

        let envelope: ApiResponse<T> = serde_json::from_str(&text).map_err(|e| {
            NotifyError::InvalidResponse(format!("{} returned {}: {}", method, status, e))
        })?;

        if !envelope.ok {
            return Err(NotifyError::Rejected {
                code: envelope.error_code.unwrap_or(status.as_u16()),
                description: envelope
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }

        envelope
            .result
            .ok_or_else(|| NotifyError::InvalidResponse(format!("{} returned no result", method)))
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn send(&self, target: &str, message: &OutboundMessage) -> NotifyResult<()> {
        self.send_message(target, message, false).await
    }
}

#[async_trait]
impl CommandChannel for TelegramClient {
    async fn poll(&self) -> NotifyResult<Vec<InboundMessage>> {
        self.get_updates().await
    }

    async fn reply(&self, chat_id: &str, message: &OutboundMessage) -> NotifyResult<()> {
        self.send_message(chat_id, message, true).await
    }
}
