//! Domain Error Types
//!
//! Pure domain errors that don't depend on the storage medium.

use chrono::NaiveDate;
use thiserror::Error;

use super::MoneyError;

/// Domain-specific errors
///
/// These errors represent record validation failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid monetary amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] MoneyError),

    /// Period end precedes its start
    #[error("Invalid period: {start} is after {end}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },

    /// Calendar values that do not form a date
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Required field left empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

impl DomainError {
    /// Create an invalid period error
    pub fn invalid_period(start: NaiveDate, end: NaiveDate) -> Self {
        Self::InvalidPeriod { start, end }
    }
}
