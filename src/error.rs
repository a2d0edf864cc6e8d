//! Error Types
//!
//! Failures surfaced by the API layer and configuration loading.

use thiserror::Error;

use crate::models::TicketKey;

/// Errors from talking to the ticket API or applying its results locally
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Server returned an invalid ticket key: {0:?}")]
    InvalidKey(String),

    #[error("Column `{column}` has {found} entries, expected {expected}")]
    ColumnMismatch {
        column: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Unknown ticket {0}")]
    UnknownTicket(TicketKey),

    #[error("Ticket store is no longer available")]
    StoreGone,
}

impl ApiError {
    /// HTTP status, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Errors from reading the persisted UI configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Browser storage is unavailable")]
    NoStorage,
}
