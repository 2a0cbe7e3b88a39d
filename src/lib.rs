//! Price Watch - threshold alerts for public price quotes
//!
//! Polls a quote API on a fixed interval and sends one-shot Telegram
//! notifications when configured price targets are crossed:
//! - Quote source and notifier adapters (CoinGecko, Telegram)
//! - Threshold state machine with per-level hysteresis
//! - Scheduler loop and on-demand status command handling

pub mod adapters;
pub mod config;
pub mod core;
pub mod error;

pub use error::AppError;
