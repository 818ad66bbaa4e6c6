//! payroll_ledger Library
//!
//! Payroll bookkeeping over a key-value store: employees, novelties,
//! advances, payroll runs and deduction rates.

pub mod app;
pub mod config;
pub mod domain;
pub mod jobs;
pub mod payroll;
pub mod store;

mod error;

pub use app::{Coordinator, Section, View};
pub use config::Config;
pub use domain::{DomainError, Money, MoneyError, PayPeriod};
pub use error::{AppError, AppResult};
pub use store::{FileStore, MemoryStore, Repository, StorageKey};
