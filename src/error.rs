//! Application-wide error types using thiserror
//!
//! All errors in the application should be wrapped in AppError
//! to provide consistent error handling across the codebase.

use thiserror::Error;

use crate::adapters::errors::{NotifyError, QuoteError};
use crate::core::threshold::ThresholdError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Quote error: {0}")]
    Quote(#[from] QuoteError),

    #[error("Notify error: {0}")]
    Notify(#[from] NotifyError),

    #[error("Threshold error: {0}")]
    Threshold(#[from] ThresholdError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
