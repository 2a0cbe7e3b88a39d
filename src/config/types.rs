//! Configuration types for the watchlist
//!
//! This module defines all configuration structs that are loaded from YAML.
//! The loaded watchlist is immutable after startup and shared across tasks
//! as `Arc<[TrackedItem]>`.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

// ============================================================================
// Defaults
// ============================================================================

/// Default polling interval in minutes
pub const DEFAULT_CHECK_INTERVAL_MINUTES: u64 = 5;

/// Default CoinGecko simple price endpoint
pub const DEFAULT_QUOTE_API_URL: &str = "https://api.coingecko.com/api/v3/simple/price";

/// Default quote currency
pub const DEFAULT_VS_CURRENCY: &str = "usd";

fn default_check_interval_minutes() -> u64 {
    DEFAULT_CHECK_INTERVAL_MINUTES
}

fn default_quote_api_url() -> String {
    DEFAULT_QUOTE_API_URL.to_string()
}

fn default_vs_currency() -> String {
    DEFAULT_VS_CURRENCY.to_string()
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// A named price target
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThresholdLevel {
    /// Level name (e.g., "realistic")
    pub name: String,
    /// Trigger price in the quote currency
    pub price: f64,
    /// Headline icon for notifications
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl ThresholdLevel {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
            icon: None,
        }
    }

    /// Level name with the first letter upper-cased ("realistic" -> "Realistic")
    pub fn title(&self) -> String {
        title_case(&self.name)
    }
}

/// A single monitored asset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackedItem {
    /// Quote source identifier (e.g., CoinGecko id "bitcoin")
    pub id: String,
    /// Short display label (e.g., "BTC")
    pub symbol: String,
    /// Long display name, defaults to the title-cased id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Price targets in strictly ascending order
    pub thresholds: Vec<ThresholdLevel>,
}

impl TrackedItem {
    pub fn new(id: impl Into<String>, symbol: impl Into<String>, thresholds: Vec<ThresholdLevel>) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            name: None,
            thresholds,
        }
    }

    /// Human-readable name ("bitcoin" -> "Bitcoin" when no name is configured)
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => title_case(&self.id),
        }
    }

    /// Notification icon for the level at `index`
    pub fn level_icon(&self, index: usize) -> &str {
        match self.thresholds.get(index).and_then(|l| l.icon.as_deref()) {
            Some(icon) => icon,
            None if index == 0 => "🎯",
            None => "🚀",
        }
    }

    /// Validate item configuration rules
    pub fn validate(&self) -> Result<(), AppError> {
        // Rule: id cannot be empty
        if self.id.trim().is_empty() {
            return Err(AppError::Config("Item id cannot be empty".to_string()));
        }

        // Rule: symbol cannot be empty
        if self.symbol.trim().is_empty() {
            return Err(AppError::Config(format!(
                "Item '{}': symbol cannot be empty",
                self.id
            )));
        }

        // Rule: at least one level
        if self.thresholds.is_empty() {
            return Err(AppError::Config(format!(
                "Item '{}': at least one threshold level is required",
                self.id
            )));
        }

        let mut names = HashSet::new();
        let mut previous: Option<&ThresholdLevel> = None;
        for level in &self.thresholds {
            if level.name.trim().is_empty() {
                return Err(AppError::Config(format!(
                    "Item '{}': threshold name cannot be empty",
                    self.id
                )));
            }

            if !names.insert(level.name.as_str()) {
                return Err(AppError::Config(format!(
                    "Item '{}': duplicate threshold name '{}'",
                    self.id, level.name
                )));
            }

            if !level.price.is_finite() || level.price <= 0.0 {
                return Err(AppError::Config(format!(
                    "Item '{}': threshold '{}' price must be a positive number (got {})",
                    self.id, level.name, level.price
                )));
            }

            // Rule: prices strictly increasing in declaration order
            if let Some(prev) = previous {
                if level.price <= prev.price {
                    return Err(AppError::Config(format!(
                        "Item '{}': threshold '{}' ({}) must be above '{}' ({})",
                        self.id, level.name, level.price, prev.name, prev.price
                    )));
                }
            }
            previous = Some(level);
        }

        Ok(())
    }
}

/// Quote API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteApiConfig {
    /// Simple price endpoint URL
    #[serde(default = "default_quote_api_url")]
    pub base_url: String,
    /// Quote currency passed as `vs_currencies`
    #[serde(default = "default_vs_currency")]
    pub vs_currency: String,
}

impl Default for QuoteApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_quote_api_url(),
            vs_currency: default_vs_currency(),
        }
    }
}

/// Notification behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Send a startup message and an initial status snapshot
    #[serde(default = "default_true")]
    pub announce_on_start: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            announce_on_start: true,
        }
    }
}

/// Root application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Minutes between the end of one tick and the start of the next
    #[serde(default = "default_check_interval_minutes")]
    pub check_interval_minutes: u64,
    /// Quote API settings
    #[serde(default)]
    pub quotes: QuoteApiConfig,
    /// Notification settings
    #[serde(default)]
    pub notifications: NotificationConfig,
    /// Watchlist
    pub items: Vec<TrackedItem>,
}

impl AppConfig {
    /// Validate all configuration rules
    pub fn validate(&self) -> Result<(), AppError> {
        // Rule: At least one item must be configured
        if self.items.is_empty() {
            return Err(AppError::Config(
                "Configuration must contain at least one item".to_string(),
            ));
        }

        if self.check_interval_minutes == 0 {
            return Err(AppError::Config(
                "check_interval_minutes must be at least 1".to_string(),
            ));
        }

        if self.check_interval_minutes.checked_mul(60).is_none() {
            return Err(AppError::Config(format!(
                "check_interval_minutes is too large ({})",
                self.check_interval_minutes
            )));
        }

        if self.quotes.vs_currency.trim().is_empty() {
            return Err(AppError::Config("quotes.vs_currency cannot be empty".to_string()));
        }

        let mut ids = HashSet::new();
        for item in &self.items {
            item.validate()?;
            if !ids.insert(item.id.as_str()) {
                return Err(AppError::Config(format!("Duplicate item id '{}'", item.id)));
            }
        }

        Ok(())
    }

    /// Pause between ticks
    ///
    /// Saturates for intervals that `validate` would reject.
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_minutes.saturating_mul(60))
    }

    /// Freeze the watchlist for sharing across tasks
    pub fn shared_items(&self) -> Arc<[TrackedItem]> {
        self.items.clone().into()
    }
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ============================================================================
// Tests
// ============================================================================
