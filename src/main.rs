//! Crypto price monitor - entry point
//!
//! 1. Loads `.env`, logging and the YAML watchlist
//! 2. Builds the CoinGecko and Telegram clients
//! 3. Optionally announces itself in the configured chat
//! 4. Runs the scheduler and the command listener until Ctrl+C

use std::path::Path;
use std::sync::Arc;

use tokio::signal;
use tracing::{error, info, warn};

use price_watch::adapters::{CoinGeckoClient, ReplyKeyboardMarkup, TelegramClient};
use price_watch::config::{self, constants, init_logging, Credentials};
use price_watch::core::{
    announce_start, command_task, CommandHandler, Scheduler, ShutdownSignal, StatusReporter,
    STATUS_BUTTON,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenvy::dotenv().ok();

    init_logging();
    info!("🚀 Crypto price monitor starting...");
    constants::log_configuration();

    let config_path = constants::config_path();
    info!("📁 Loading configuration from {}...", config_path);
    let config = match config::load_config(Path::new(&config_path)) {
        Ok(cfg) => {
            let symbols: Vec<&str> = cfg.items.iter().map(|i| i.symbol.as_str()).collect();
            info!(
                items = cfg.items.len(),
                interval_minutes = cfg.check_interval_minutes,
                "[CONFIG] Watching {:?}",
                symbols
            );
            cfg
        }
        Err(e) => {
            error!("[ERROR] Configuration failed: {}", e);
            std::process::exit(1);
        }
    };

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            error!("[ERROR] Credentials missing: {}", e);
            std::process::exit(1);
        }
    };

    let items = config.shared_items();
    let quotes = Arc::new(CoinGeckoClient::new(&config.quotes, constants::quote_fetch_timeout())?);
    let telegram = Arc::new(
        TelegramClient::new(
            &credentials,
            constants::telegram_send_timeout(),
            constants::telegram_poll_timeout_secs(),
        )?
        .with_reply_keyboard(ReplyKeyboardMarkup::persistent(&[STATUS_BUTTON])),
    );

    let reporter = Arc::new(StatusReporter::new(items.clone(), quotes.clone()));

    if config.notifications.announce_on_start {
        announce_start(reporter.as_ref(), telegram.as_ref(), &credentials.chat_id).await;
    }

    let scheduler = Scheduler::new(
        items,
        quotes,
        telegram.clone(),
        credentials.chat_id.clone(),
        config.check_interval(),
    )?;

    let shutdown = ShutdownSignal::new();
    let scheduler_handle = tokio::spawn(scheduler.run(shutdown.subscribe()));
    let command_handle = tokio::spawn(command_task(
        telegram,
        CommandHandler::new(reporter),
        constants::command_retry_delay(),
        shutdown.subscribe(),
    ));

    info!("⏳ Monitoring. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => info!("[SHUTDOWN] Graceful shutdown initiated"),
        Err(e) => error!("Failed to listen for Ctrl+C signal: {}", e),
    }
    shutdown.trigger();

    let grace = constants::shutdown_grace_period();
    let stopped = tokio::time::timeout(grace, async {
        if let Err(e) = scheduler_handle.await {
            error!(error = %e, "Scheduler task failed");
        }
        if let Err(e) = command_handle.await {
            error!(error = %e, "Command task failed");
        }
    })
    .await;

    if stopped.is_err() {
        warn!(grace_secs = grace.as_secs(), "[SHUTDOWN] Tasks still busy after grace period, abandoning");
    }

    info!("[SHUTDOWN] Clean exit");
    Ok(())
}
