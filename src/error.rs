//! Error handling module
//!
//! Crate-wide error type for operations that span layers.

use uuid::Uuid;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Employee not found: {0}")]
    EmployeeNotFound(Uuid),

    #[error("No tokio runtime available to schedule background jobs")]
    NoRuntime,

    // Domain errors
    #[error(transparent)]
    Domain(#[from] crate::domain::DomainError),

    #[error(transparent)]
    Payroll(#[from] crate::payroll::PayrollError),

    // Infrastructure errors
    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl AppError {
    /// Check if this error was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::EmployeeNotFound(_) | AppError::Domain(_) | AppError::Payroll(_)
        )
    }
}
