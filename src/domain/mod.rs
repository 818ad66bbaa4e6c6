//! Domain module
//!
//! Plain payroll records and the money/period primitives they are built on.

pub mod advance;
pub mod employee;
pub mod error;
pub mod money;
pub mod novelty;
pub mod payroll;
pub mod period;
pub mod rates;

pub use advance::AdvancePayment;
pub use employee::{to_payroll_time, Employee, PAYROLL_UTC_OFFSET_HOURS};
pub use error::DomainError;
pub use money::{round_minor, Money, MoneyError, MINOR_UNITS};
pub use novelty::{Novelty, NoveltyEffect, NoveltyKind};
pub use payroll::{DeductionLine, PayrollCalculation, PayrollWarning};
pub use period::{Fortnight, PayPeriod, COMMERCIAL_MONTH_DAYS};
pub use rates::{DeductionRates, RateBase, RateEntry, RateKind, UnreadableRate, REQUIRED_RATES};
