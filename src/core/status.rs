//! On-demand status snapshots
//!
//! The reporter performs its own quote fetch and compares the result with
//! the static watchlist. It never reads the scheduler's fired flags, so it
//! can run concurrently with a tick without any locking.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::adapters::traits::{Notifier, QuoteSource};
use crate::adapters::types::{ObservationBatch, OutboundMessage};
use crate::config::TrackedItem;
use crate::core::format::{escape_html, format_local_time, format_price, format_usd};

/// Reply used whenever a snapshot cannot be produced
pub const UNAVAILABLE_MESSAGE: &str = "❌ Could not fetch current prices. Please try again later.";

/// First line of the startup announcement
pub const STARTUP_MESSAGE: &str = "🤖 Crypto Price Monitor Started!";

/// Position of an observed price relative to one level
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LevelStatus {
    Reached,
    /// Signed percentage distance, `(observed - target) / target * 100`
    Gap(f64),
}

impl LevelStatus {
    pub fn compute(observed: f64, target: f64) -> Self {
        if observed >= target {
            LevelStatus::Reached
        } else {
            LevelStatus::Gap((observed - target) / target * 100.0)
        }
    }

    pub fn marker(&self) -> String {
        match self {
            LevelStatus::Reached => "✅".to_string(),
            LevelStatus::Gap(pct) => format!("📈 {:+.1}%", pct),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelProgress {
    pub title: String,
    pub target: f64,
    pub status: LevelStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemSnapshot {
    pub symbol: String,
    pub observed: f64,
    pub levels: Vec<LevelProgress>,
}

/// Compare a batch against the watchlist
///
/// Returns `None` unless every item has a finite price.
pub fn build_snapshot(items: &[TrackedItem], batch: &ObservationBatch) -> Option<Vec<ItemSnapshot>> {
    items
        .iter()
        .map(|item| {
            let observed = batch.price(&item.id).filter(|p| p.is_finite())?;
            let levels = item
                .thresholds
                .iter()
                .map(|level| LevelProgress {
                    title: level.title(),
                    target: level.price,
                    status: LevelStatus::compute(observed, level.price),
                })
                .collect();
            Some(ItemSnapshot {
                symbol: item.symbol.clone(),
                observed,
                levels,
            })
        })
        .collect()
}

/// HTML rendering of a snapshot with the "Last updated" footer
pub fn render_snapshot_text(snapshot: &[ItemSnapshot], observed_at: chrono::DateTime<Utc>) -> String {
    let mut message = String::from("📊 <b>Current Crypto Status</b>\n\n");

    for item in snapshot {
        message.push_str(&format!(
            "<b>{}</b> - {}\n",
            escape_html(&item.symbol),
            format_usd(item.observed)
        ));
        for level in &item.levels {
            message.push_str(&format!(
                "  {} ({}): {}\n",
                escape_html(&level.title),
                format_usd(level.target),
                level.status.marker()
            ));
        }
        message.push('\n');
    }

    message.push_str(&format!("Last updated: {}", format_local_time(observed_at)));
    message
}

/// Read-only snapshot and help renderer shared with the command task
pub struct StatusReporter<Q: ?Sized> {
    items: Arc<[TrackedItem]>,
    quotes: Arc<Q>,
}

impl<Q: QuoteSource + ?Sized> StatusReporter<Q> {
    pub fn new(items: Arc<[TrackedItem]>, quotes: Arc<Q>) -> Self {
        Self { items, quotes }
    }

    /// Fetch fresh prices and render them, or the unavailable message
    pub async fn render_snapshot(&self) -> String {
        let ids: Vec<String> = self.items.iter().map(|item| item.id.clone()).collect();

        let batch = match self.quotes.fetch(&ids).await {
            Ok(batch) => batch,
            Err(e) => {
                warn!(error = %e, "Status query could not fetch prices");
                return UNAVAILABLE_MESSAGE.to_string();
            }
        };

        match build_snapshot(&self.items, &batch) {
            Some(snapshot) => render_snapshot_text(&snapshot, batch.observed_at()),
            None => {
                warn!(
                    missing = ?batch.missing(ids.iter().map(String::as_str)),
                    "Status query got an incomplete batch"
                );
                UNAVAILABLE_MESSAGE.to_string()
            }
        }
    }

    pub fn render_welcome(&self) -> String {
        "🤖 <b>Crypto Price Monitor Bot</b>\n\n\
         I'll notify you when your cryptocurrency targets are reached!\n\n\
         <b>Available commands:</b>\n\
         /help - Show this help message\n\n\
         Use the <b>📊 Status</b> button below to check current prices anytime!\n\
         The bot automatically checks prices every few minutes."
            .to_string()
    }

    /// Help text followed by every item and its targets
    pub fn render_help(&self) -> String {
        let mut message = String::from(
            "🤖 <b>Crypto Price Monitor Bot Help</b>\n\n\
             <b>What I do:</b>\n\
             • Monitor cryptocurrency prices continuously\n\
             • Send notifications when your target prices are reached\n\
             • Track every configured price target per coin\n\n\
             <b>Commands:</b>\n\
             /start - Welcome message and bot info\n\
             /status - Show current prices and progress to targets\n\
             /help - Show this help message\n\n\
             <b>Monitored Coins:</b>\n",
        );

        for item in self.items.iter() {
            let targets = item
                .thresholds
                .iter()
                .map(|level| format!("${}", format_price(level.price, 0)))
                .collect::<Vec<_>>()
                .join(" / ");
            message.push_str(&format!("• {}: {}\n", escape_html(&item.symbol), targets));
        }

        message
    }
}

/// Send the startup banner and a first snapshot to `target`
///
/// Each message is sent independently; delivery failures are logged and
/// otherwise ignored.
pub async fn announce_start<Q, N>(reporter: &StatusReporter<Q>, notifier: &N, target: &str)
where
    Q: QuoteSource + ?Sized,
    N: Notifier + ?Sized,
{
    if let Err(e) = notifier.send(target, &OutboundMessage::plain(STARTUP_MESSAGE)).await {
        error!(error = %e, "Failed to send startup message");
    }

    let snapshot = reporter.render_snapshot().await;
    match notifier.send(target, &OutboundMessage::html(snapshot)).await {
        Ok(()) => info!("Startup announcement sent"),
        Err(e) => error!(error = %e, "Failed to send startup status"),
    }
}
