//! Adapter error types
//!
//! Quote and notification failures are kept apart so the scheduler can
//! treat them differently: a quote failure skips the tick, a notify
//! failure only drops one message.

use thiserror::Error;

/// Errors returned by a quote source
#[derive(Error, Debug)]
pub enum QuoteError {
    /// Transport failure or timeout
    #[error("Quote request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("Quote API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Body could not be decoded
    #[error("Invalid quote response: {0}")]
    InvalidResponse(String),

    /// Some requested ids were absent from the response
    #[error("Missing quotes for: {}", .0.join(", "))]
    MissingQuotes(Vec<String>),

    /// A quote was present but not a usable number
    #[error("Invalid price for {id}: {price}")]
    InvalidPrice { id: String, price: f64 },
}

/// Result type alias for quote operations
pub type QuoteResult<T> = std::result::Result<T, QuoteError>;

/// Errors returned by a notifier or command channel
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Transport failure or timeout
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The messaging API refused the request
    #[error("Rejected ({code}): {description}")]
    Rejected { code: u16, description: String },

    /// Body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type alias for notify operations
pub type NotifyResult<T> = std::result::Result<T, NotifyError>;
