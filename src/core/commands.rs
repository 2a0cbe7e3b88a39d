//! Chat command handling
//!
//! Inbound messages are parsed into [`Command`]s and answered by the
//! [`CommandHandler`]. `command_task` drives the long-poll loop until
//! shutdown. Commands are answered one at a time in arrival order.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::adapters::traits::{CommandChannel, QuoteSource};
use crate::adapters::types::{InboundMessage, OutboundMessage};
use crate::core::status::StatusReporter;

/// Label of the persistent reply keyboard button
pub const STATUS_BUTTON: &str = "📊 Status";

/// Reply for anything that is not a known command
pub const UNKNOWN_COMMAND_REPLY: &str =
    "I don't understand that command. Use the 📊 Status button or /help for available options.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Status,
    Unknown(String),
}

impl Command {
    /// Parse message text
    ///
    /// Accepts `/cmd`, `/cmd@BotName` and trailing arguments, which are
    /// ignored. The status button text maps to [`Command::Status`].
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text == STATUS_BUTTON {
            return Command::Status;
        }

        let Some(rest) = text.strip_prefix('/') else {
            return Command::Unknown(text.to_string());
        };

        let word = rest.split_whitespace().next().unwrap_or_default();
        let name = word.split('@').next().unwrap_or_default();

        match name.to_ascii_lowercase().as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "status" => Command::Status,
            _ => Command::Unknown(text.to_string()),
        }
    }
}

/// Turns commands into replies
pub struct CommandHandler<Q: ?Sized> {
    reporter: Arc<StatusReporter<Q>>,
}

impl<Q: QuoteSource + ?Sized> CommandHandler<Q> {
    pub fn new(reporter: Arc<StatusReporter<Q>>) -> Self {
        Self { reporter }
    }

    pub async fn handle(&self, command: &Command) -> OutboundMessage {
        match command {
            Command::Start => OutboundMessage::html(self.reporter.render_welcome()),
            Command::Help => OutboundMessage::html(self.reporter.render_help()),
            Command::Status => OutboundMessage::html(self.reporter.render_snapshot().await),
            Command::Unknown(_) => OutboundMessage::plain(UNKNOWN_COMMAND_REPLY),
        }
    }

    /// Parse and answer one inbound message
    pub async fn respond(&self, message: &InboundMessage) -> OutboundMessage {
        let command = Command::parse(&message.text);
        debug!(chat_id = %message.chat_id, command = ?command, "Handling command");
        self.handle(&command).await
    }
}

/// Poll `channel` and answer every message until shutdown
///
/// Poll errors are logged and retried after `retry_delay`. Reply errors
/// are logged and the message is dropped.
pub async fn command_task<C, Q>(
    channel: Arc<C>,
    handler: CommandHandler<Q>,
    retry_delay: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) where
    C: CommandChannel + ?Sized,
    Q: QuoteSource + ?Sized,
{
    info!("Command listener started");

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("Command listener shutting down");
                break;
            }
            polled = channel.poll() => {
                match polled {
                    Ok(messages) => {
                        for message in messages {
                            let reply = handler.respond(&message).await;
                            if let Err(e) = channel.reply(&message.chat_id, &reply).await {
                                error!(chat_id = %message.chat_id, error = %e, "Failed to send reply");
                            }
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Polling for commands failed, retrying");
                        tokio::select! {
                            _ = shutdown_rx.recv() => {
                                info!("Command listener shutting down");
                                break;
                            }
                            _ = tokio::time::sleep(retry_delay) => {}
                        }
                    }
                }
            }
        }
    }
}
