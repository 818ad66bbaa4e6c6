//! Payroll module
//!
//! Derives gross pay, deductions and net pay for an employee and period
//! from its novelties, advances and the current deduction rates.

mod calculator;
mod error;
mod summary;

pub use calculator::PayrollCalculator;
pub use error::PayrollError;
pub use summary::PayrollSummary;
