use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

/// Error type shared by every ledger operation.
///
/// Ownership failures are reported as [`FinanceError::NotFound`] so callers cannot
/// distinguish a foreign entity from a missing one.
#[derive(Debug, Error)]
pub enum FinanceError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: Decimal, requested: Decimal },
    #[error("Payment exceeds the remaining amount of {remaining}")]
    Overpayment { remaining: Decimal },
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, FinanceError>;

impl FinanceError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        FinanceError::Validation(message.into())
    }

    pub(crate) fn not_found(entity: impl Into<String>) -> Self {
        FinanceError::NotFound(entity.into())
    }

    /// Arithmetic on `what` left the representable decimal range.
    pub(crate) fn out_of_range(what: impl fmt::Display) -> Self {
        FinanceError::Validation(format!("{} exceeds the supported amount range", what))
    }
}

impl From<std::io::Error> for FinanceError {
    fn from(err: std::io::Error) -> Self {
        FinanceError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for FinanceError {
    fn from(err: serde_json::Error) -> Self {
        FinanceError::Storage(err.to_string())
    }
}
