//! Core module - threshold tracking, scheduling, status and commands
//!
//! This module uses explicit re-exports instead of glob exports so the
//! public surface stays visible in one place.
//!
//! ```ignore
//! use price_watch::core::{Scheduler, StatusReporter, ThresholdBook};
//! ```

pub mod channels;
pub mod commands;
pub mod events;
pub mod format;
pub mod scheduler;
pub mod status;
pub mod threshold;

pub use channels::ShutdownSignal;

pub use commands::{command_task, Command, CommandHandler, STATUS_BUTTON, UNKNOWN_COMMAND_REPLY};

pub use events::NotificationEvent;

pub use format::{escape_html, format_local_time, format_price, format_usd, TIMESTAMP_FORMAT};

pub use scheduler::{Scheduler, SchedulerPhase, TickOutcome};

pub use status::{
    announce_start, build_snapshot, ItemSnapshot, LevelProgress, LevelStatus, StatusReporter,
    STARTUP_MESSAGE, UNAVAILABLE_MESSAGE,
};

pub use threshold::{evaluate, ThresholdBook, ThresholdError, ThresholdState};
