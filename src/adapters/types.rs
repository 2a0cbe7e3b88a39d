//! Types shared by adapters and the core

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// Point-in-time prices keyed by item id
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationBatch {
    prices: HashMap<String, f64>,
    observed_at: DateTime<Utc>,
}

impl ObservationBatch {
    pub fn new(prices: HashMap<String, f64>) -> Self {
        Self::at(prices, Utc::now())
    }

    pub fn at(prices: HashMap<String, f64>, observed_at: DateTime<Utc>) -> Self {
        Self { prices, observed_at }
    }

    pub fn price(&self, id: &str) -> Option<f64> {
        self.prices.get(id).copied()
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Ids from `expected` with no finite price in this batch
    pub fn missing<'a, I>(&self, expected: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        expected
            .into_iter()
            .filter(|id| !self.price(id).is_some_and(f64::is_finite))
            .map(str::to_string)
            .collect()
    }
}

impl FromIterator<(String, f64)> for ObservationBatch {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Formatting hint for outgoing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Plain text
    Plain,
    /// Telegram HTML subset (`<b>` for bold)
    Html,
}

/// A message received from the command channel
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    /// Chat to answer in
    pub chat_id: String,
    /// Raw message text
    pub text: String,
}

/// Outgoing message
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub text: String,
    pub parse_mode: ParseMode,
}

impl OutboundMessage {
    pub fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: ParseMode::Html,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: ParseMode::Plain,
        }
    }
}
