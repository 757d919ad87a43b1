//! SalesPulse error types.

use thiserror::Error;

/// All errors produced by SalesPulse crates.
#[derive(Error, Debug)]
pub enum PulseError {
    /// Record store request failed (query, insert, or update).
    #[error("Store error: {0}")]
    Store(String),

    /// Outbound notification channel failure (SMTP, address parsing).
    #[error("Channel error: {0}")]
    Channel(String),

    /// Configuration loading or validation failure.
    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, PulseError>;
