//! Threshold notification events
//!
//! A `NotificationEvent` is produced by the threshold state machine each
//! time a level is crossed upward while armed. The scheduler turns it into
//! a chat message with [`NotificationEvent::to_message`].

use chrono::{DateTime, Utc};
use tracing::info;

use crate::adapters::types::OutboundMessage;
use crate::config::{ThresholdLevel, TrackedItem};
use crate::core::format::{escape_html, format_local_time, format_usd};

/// One level crossed by one item
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationEvent {
    pub item_id: String,
    pub symbol: String,
    pub display_name: String,
    pub level_name: String,
    /// Level name as shown in the headline ("Realistic")
    pub level_title: String,
    /// Position of the level in the item's ascending threshold list
    pub level_index: usize,
    pub icon: String,
    pub target_price: f64,
    pub observed_price: f64,
    pub timestamp: DateTime<Utc>,
}

impl NotificationEvent {
    /// Event for `level`, the entry at `level_index` of `item.thresholds`
    pub fn new(
        item: &TrackedItem,
        level_index: usize,
        level: &ThresholdLevel,
        observed_price: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            item_id: item.id.clone(),
            symbol: item.symbol.clone(),
            display_name: item.display_name(),
            level_name: level.name.clone(),
            level_title: level.title(),
            level_index,
            icon: item.level_icon(level_index).to_string(),
            target_price: level.price,
            observed_price,
            timestamp,
        }
    }

    /// HTML chat message announcing the crossing
    pub fn to_message(&self) -> OutboundMessage {
        OutboundMessage::html(format!(
            "{} <b>{} Target Reached!</b>\n\n\
             <b>{}</b> ({})\n\
             Current Price: <b>{}</b>\n\
             Target Price: <b>{}</b>\n\
             Time: {}",
            self.icon,
            escape_html(&self.level_title),
            escape_html(&self.symbol),
            escape_html(&self.display_name),
            format_usd(self.observed_price),
            format_usd(self.target_price),
            format_local_time(self.timestamp),
        ))
    }

    /// Structured log line for the crossing
    pub fn log(&self) {
        info!(
            event_type = "THRESHOLD_REACHED",
            item = %self.item_id,
            symbol = %self.symbol,
            level = %self.level_name,
            target = self.target_price,
            observed = self.observed_price,
            "[ALERT] {} {} target reached",
            self.symbol,
            self.level_name
        );
    }
}
