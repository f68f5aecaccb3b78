//! Error taxonomy shared by every component of the bot.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BotError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BotError {
    /// Malformed code, url or time input. Rejected before any state change.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Unknown code. A normal outcome, not a fault.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not in the admin identity set.
    #[error("Permission denied")]
    Permission,

    /// Membership or publish oracle failure.
    #[error("External service error: {0}")]
    External(String),

    /// Connection pool or SQL failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Runtime failure outside the taxonomy above (no async runtime for a
    /// job, a worker task that died).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for BotError {
    fn from(e: rusqlite::Error) -> Self {
        BotError::Storage(e.to_string())
    }
}

impl From<r2d2::Error> for BotError {
    fn from(e: r2d2::Error) -> Self {
        BotError::Storage(e.to_string())
    }
}
