//! Error types for Ledgerlens

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid date {value:?} on transaction {id}")]
    InvalidDate { id: String, value: String },

    #[error("Invalid amount {amount} on transaction {id}: amounts must be finite and non-negative")]
    InvalidAmount { id: String, amount: f64 },

    #[error("Input too large: {count} transactions exceeds the limit of {limit}")]
    InputTooLarge { count: usize, limit: usize },

    #[error("Date out of range: {0}")]
    DateOutOfRange(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
