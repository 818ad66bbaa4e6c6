//! Payroll calculation errors
//!
//! Edge cases (missing rates, advance overruns) are not errors: they are
//! reported as warnings on the calculation itself.

use crate::domain::{DomainError, MoneyError};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PayrollError {
    /// Invalid input records or period
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A computed figure fell outside the money range
    #[error("Amount out of range: {0}")]
    Money(#[from] MoneyError),
}
