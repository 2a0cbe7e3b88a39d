//! Periodic evaluation loop
//!
//! The scheduler is the only owner of the watchlist's threshold state.
//! Each tick fetches every tracked price in one batch, then either applies
//! the whole batch or nothing at all:
//!
//! - fetch failed or any price missing: tick skipped, state untouched
//! - internal error while evaluating: tick abandoned, state untouched
//! - otherwise: state committed, one message per crossed level
//!
//! The next tick starts `interval` after the previous one finished.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::adapters::traits::{Notifier, QuoteSource};
use crate::adapters::types::ObservationBatch;
use crate::config::TrackedItem;
use crate::core::events::NotificationEvent;
use crate::core::format::format_usd;
use crate::core::threshold::ThresholdBook;
use crate::error::AppError;

/// Lifecycle of the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
    Running,
    /// Terminal
    Stopped,
}

/// Result of one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Batch applied; `failed` notifications were dropped
    Evaluated { notified: usize, failed: usize },
    /// Quote fetch failed or was incomplete
    Skipped { reason: String },
    /// Internal error; nothing applied
    Abandoned { error: String },
}

impl fmt::Display for TickOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TickOutcome::Evaluated { notified, failed } => {
                write!(f, "evaluated ({} notified, {} failed)", notified, failed)
            }
            TickOutcome::Skipped { reason } => write!(f, "skipped: {}", reason),
            TickOutcome::Abandoned { error } => write!(f, "abandoned: {}", error),
        }
    }
}

pub struct Scheduler<Q: ?Sized, N: ?Sized> {
    items: Arc<[TrackedItem]>,
    ids: Vec<String>,
    book: ThresholdBook,
    quotes: Arc<Q>,
    notifier: Arc<N>,
    /// Chat receiving notifications
    target: String,
    interval: Duration,
    phase: SchedulerPhase,
    ticks: u64,
}

impl<Q, N> Scheduler<Q, N>
where
    Q: QuoteSource + ?Sized,
    N: Notifier + ?Sized,
{
    pub fn new(
        items: Arc<[TrackedItem]>,
        quotes: Arc<Q>,
        notifier: Arc<N>,
        target: impl Into<String>,
        interval: Duration,
    ) -> Result<Self, AppError> {
        if items.is_empty() {
            return Err(AppError::Config("Scheduler needs at least one item".to_string()));
        }
        if interval.is_zero() {
            return Err(AppError::Config("Scheduler interval must be non-zero".to_string()));
        }

        let ids = items.iter().map(|item| item.id.clone()).collect();
        let book = ThresholdBook::new(&items);

        Ok(Self {
            items,
            ids,
            book,
            quotes,
            notifier,
            target: target.into(),
            interval,
            phase: SchedulerPhase::Running,
            ticks: 0,
        })
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    /// Current fired flags (read-only view for tests and diagnostics)
    pub fn book(&self) -> &ThresholdBook {
        &self.book
    }

    /// Run one fetch/evaluate/notify cycle
    pub async fn run_tick(&mut self) -> TickOutcome {
        self.ticks += 1;
        debug!(tick = self.ticks, source = self.quotes.source_name(), "Checking prices");

        let batch = match self.quotes.fetch(&self.ids).await {
            Ok(batch) => batch,
            Err(e) => {
                warn!(tick = self.ticks, error = %e, "Could not fetch prices, skipping this check");
                return TickOutcome::Skipped { reason: e.to_string() };
            }
        };

        let missing = batch.missing(self.ids.iter().map(String::as_str));
        if !missing.is_empty() {
            warn!(tick = self.ticks, missing = ?missing, "Incomplete price batch, skipping this check");
            return TickOutcome::Skipped {
                reason: format!("missing quotes for {}", missing.join(", ")),
            };
        }

        info!(tick = self.ticks, "Current prices - {}", self.price_line(&batch));

        let events = match self.evaluate_batch(&batch) {
            Ok(events) => events,
            Err(e) => {
                error!(tick = self.ticks, error = %e, "Evaluation failed, abandoning this check");
                return TickOutcome::Abandoned { error: e.to_string() };
            }
        };

        let mut notified = 0;
        let mut failed = 0;
        for event in &events {
            event.log();
            match self.notifier.send(&self.target, &event.to_message()).await {
                Ok(()) => {
                    notified += 1;
                    info!(item = %event.item_id, level = %event.level_name, "Notification sent");
                }
                Err(e) => {
                    failed += 1;
                    error!(
                        item = %event.item_id,
                        level = %event.level_name,
                        error = %e,
                        "Error sending notification, dropping it"
                    );
                }
            }
        }

        TickOutcome::Evaluated { notified, failed }
    }

    /// Evaluate every item on a copy of the book; commit only if all succeed
    fn evaluate_batch(&mut self, batch: &ObservationBatch) -> Result<Vec<NotificationEvent>, AppError> {
        let mut next = self.book.clone();
        let mut events = Vec::new();

        for (index, item) in self.items.iter().enumerate() {
            let price = batch.price(&item.id).ok_or_else(|| {
                AppError::Config(format!("No price for '{}' after completeness check", item.id))
            })?;
            events.extend(next.evaluate(&self.items, index, price, batch.observed_at())?);
        }

        self.book = next;
        Ok(events)
    }

    fn price_line(&self, batch: &ObservationBatch) -> String {
        self.items
            .iter()
            .filter_map(|item| {
                batch
                    .price(&item.id)
                    .map(|price| format!("{}: {}", item.symbol, format_usd(price)))
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Tick until the shutdown signal arrives
    ///
    /// The first tick runs immediately. A tick in progress is allowed to
    /// finish; the sleep between ticks is interrupted by shutdown.
    pub async fn run(mut self, mut shutdown_rx: broadcast::Receiver<()>) -> SchedulerPhase {
        info!(
            items = self.items.len(),
            interval_secs = self.interval.as_secs(),
            "Starting price monitoring (checking every {} minutes)",
            self.interval.as_secs() / 60
        );

        while self.phase == SchedulerPhase::Running {
            let outcome = self.run_tick().await;
            debug!(tick = self.ticks, outcome = %outcome, "Tick finished");

            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!(ticks = self.ticks, "Scheduler shutting down");
                    self.phase = SchedulerPhase::Stopped;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!("Scheduler stopped");
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::errors::{NotifyError, NotifyResult, QuoteError, QuoteResult};
    use crate::adapters::types::OutboundMessage;
    use crate::config::ThresholdLevel;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::time::timeout;

    /// Replays scripted fetch results; `None` simulates a failed fetch
    struct ScriptedQuotes {
        script: Mutex<VecDeque<Option<Vec<(&'static str, f64)>>>>,
        calls: Mutex<usize>,
    }

    impl ScriptedQuotes {
        fn new(script: Vec<Option<Vec<(&'static str, f64)>>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl QuoteSource for ScriptedQuotes {
        async fn fetch(&self, _ids: &[String]) -> QuoteResult<ObservationBatch> {
            *self.calls.lock().unwrap() += 1;
            match self.script.lock().unwrap().pop_front().flatten() {
                Some(prices) => Ok(prices
                    .into_iter()
                    .map(|(id, price)| (id.to_string(), price))
                    .collect()),
                None => Err(QuoteError::InvalidResponse("scripted failure".into())),
            }
        }

        fn source_name(&self) -> &'static str {
            "scripted"
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl RecordingNotifier {
        fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn messages(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, target: &str, message: &OutboundMessage) -> NotifyResult<()> {
            self.sent
                .lock()
                .unwrap()
                .push((target.to_string(), message.text.clone()));
            if self.fail {
                Err(NotifyError::Rejected {
                    code: 500,
                    description: "down".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn items() -> Arc<[TrackedItem]> {
        vec![
            TrackedItem::new(
                "bitcoin",
                "BTC",
                vec![
                    ThresholdLevel::new("realistic", 100.0),
                    ThresholdLevel::new("optimistic", 200.0),
                ],
            ),
            TrackedItem::new("ethereum", "ETH", vec![ThresholdLevel::new("realistic", 10.0)]),
        ]
        .into()
    }

    fn scheduler(
        quotes: Arc<ScriptedQuotes>,
        notifier: Arc<RecordingNotifier>,
    ) -> Scheduler<ScriptedQuotes, RecordingNotifier> {
        Scheduler::new(items(), quotes, notifier, "chat-1", Duration::from_millis(10)).unwrap()
    }

    #[tokio::test]
    async fn test_tick_notifies_crossed_levels_in_order() {
        let quotes = Arc::new(ScriptedQuotes::new(vec![Some(vec![("bitcoin", 250.0), ("ethereum", 5.0)])]));
        let notifier = Arc::new(RecordingNotifier::default());
        let mut scheduler = scheduler(quotes, notifier.clone());

        let outcome = scheduler.run_tick().await;

        assert_eq!(outcome, TickOutcome::Evaluated { notified: 2, failed: 0 });
        let messages = notifier.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].0, "chat-1");
        assert!(messages[0].1.contains("Realistic Target Reached"));
        assert!(messages[1].1.contains("Optimistic Target Reached"));
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_state_untouched() {
        let quotes = Arc::new(ScriptedQuotes::new(vec![
            Some(vec![("bitcoin", 150.0), ("ethereum", 20.0)]),
            None,
        ]));
        let notifier = Arc::new(RecordingNotifier::default());
        let mut scheduler = scheduler(quotes, notifier.clone());

        scheduler.run_tick().await;
        let before = scheduler.book().clone();
        let sent_before = notifier.messages().len();

        let outcome = scheduler.run_tick().await;

        assert!(matches!(outcome, TickOutcome::Skipped { .. }));
        assert_eq!(scheduler.book(), &before);
        assert_eq!(notifier.messages().len(), sent_before);
    }

    #[tokio::test]
    async fn test_partial_batch_is_skipped() {
        // ethereum missing, bitcoin would otherwise fire
        let quotes = Arc::new(ScriptedQuotes::new(vec![Some(vec![("bitcoin", 150.0)])]));
        let notifier = Arc::new(RecordingNotifier::default());
        let mut scheduler = scheduler(quotes, notifier.clone());

        let outcome = scheduler.run_tick().await;

        match outcome {
            TickOutcome::Skipped { reason } => assert!(reason.contains("ethereum"), "Got: {}", reason),
            other => panic!("Expected Skipped, got {:?}", other),
        }
        assert_eq!(scheduler.book().get(0).unwrap().fired_count(), 0);
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_non_finite_price_is_skipped() {
        let quotes = Arc::new(ScriptedQuotes::new(vec![Some(vec![
            ("bitcoin", f64::INFINITY),
            ("ethereum", 20.0),
        ])]));
        let notifier = Arc::new(RecordingNotifier::default());
        let mut scheduler = scheduler(quotes, notifier.clone());

        assert!(matches!(scheduler.run_tick().await, TickOutcome::Skipped { .. }));
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_notifier_failure_is_not_fatal_and_not_retried() {
        let quotes = Arc::new(ScriptedQuotes::new(vec![
            Some(vec![("bitcoin", 150.0), ("ethereum", 5.0)]),
            Some(vec![("bitcoin", 150.0), ("ethereum", 5.0)]),
        ]));
        let notifier = Arc::new(RecordingNotifier::failing());
        let mut scheduler = scheduler(quotes, notifier.clone());

        let outcome = scheduler.run_tick().await;
        assert_eq!(outcome, TickOutcome::Evaluated { notified: 0, failed: 1 });
        // Level stays fired even though delivery failed
        assert!(scheduler.book().get(0).unwrap().is_fired(0));

        let outcome = scheduler.run_tick().await;
        assert_eq!(outcome, TickOutcome::Evaluated { notified: 0, failed: 0 });
        assert_eq!(notifier.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_empty_watchlist() {
        let quotes = Arc::new(ScriptedQuotes::new(vec![]));
        let notifier = Arc::new(RecordingNotifier::default());
        let empty: Arc<[TrackedItem]> = Vec::new().into();

        let result = Scheduler::new(empty, quotes, notifier, "chat", Duration::from_secs(60));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_run_ticks_until_shutdown() {
        let quotes = Arc::new(ScriptedQuotes::new(vec![]));
        let notifier = Arc::new(RecordingNotifier::default());
        let scheduler = scheduler(quotes.clone(), notifier);
        assert_eq!(scheduler.phase(), SchedulerPhase::Running);

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn(scheduler.run(shutdown_rx));

        tokio::time::sleep(Duration::from_millis(60)).await;
        shutdown_tx.send(()).unwrap();

        let phase = timeout(Duration::from_secs(1), handle)
            .await
            .expect("Scheduler should stop on shutdown")
            .unwrap();
        assert_eq!(phase, SchedulerPhase::Stopped);
        // First tick is immediate, later ticks follow the 10ms interval
        assert!(quotes.calls() >= 2, "Got {} calls", quotes.calls());
    }

    #[test]
    fn test_outcome_display() {
        let outcome = TickOutcome::Evaluated { notified: 1, failed: 2 };
        assert_eq!(outcome.to_string(), "evaluated (1 notified, 2 failed)");
    }
}
