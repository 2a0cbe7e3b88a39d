//! Adapter trait definitions
//!
//! The core only talks to the outside world through these traits, so the
//! scheduler and command handling can be driven by mocks in tests.

use async_trait::async_trait;

use crate::adapters::errors::{NotifyResult, QuoteResult};
use crate::adapters::types::{InboundMessage, ObservationBatch, OutboundMessage};

/// Batched price lookup
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch current prices for all `ids` in one call
    ///
    /// Implementations must fail rather than return a batch that lacks
    /// any requested id.
    async fn fetch(&self, ids: &[String]) -> QuoteResult<ObservationBatch>;

    /// Source name for logging
    fn source_name(&self) -> &'static str;
}

/// Fire-and-forget message delivery
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `message` to `target`
    async fn send(&self, target: &str, message: &OutboundMessage) -> NotifyResult<()>;
}

/// Inbound side of the interactive command surface
#[async_trait]
pub trait CommandChannel: Send + Sync {
    /// Wait for the next batch of inbound messages
    ///
    /// May return an empty batch when the poll window elapses.
    async fn poll(&self) -> NotifyResult<Vec<InboundMessage>>;

    /// Answer a message in its chat
    async fn reply(&self, chat_id: &str, message: &OutboundMessage) -> NotifyResult<()>;
}
