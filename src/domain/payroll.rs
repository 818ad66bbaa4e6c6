//! Payroll calculation records
//!
//! A `PayrollCalculation` is the stored outcome of one payroll run for one
//! employee and one period. It snapshots the novelties and advances that
//! contributed, and carries any warnings raised while computing it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Money, PayPeriod};

/// One statutory deduction applied in a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductionLine {
    pub name: String,
    /// Portion of gross the entry applied to
    pub base: Money,
    pub amount: Money,
}

/// Conditions the caller should review; the calculation still completes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum PayrollWarning {
    /// A required rate entry is absent; treated as zero
    MissingRate { name: String },
    /// A rate entry could not be applied; treated as zero
    MalformedRate { name: String, reason: String },
    /// Advances exceed the net pay before advances
    AdvanceOverrun { amount: Money },
    /// Deductions exceed gross pay
    DeductionsExceedGross { excess: Money },
    /// No worked days fall in the period
    NoWorkedDays,
}

/// Computed payroll for one employee and period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollCalculation {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub employee_name: String,
    pub period: PayPeriod,

    /// Days paid in the period, after absences
    pub worked_days: u32,

    /// Salary prorated to `worked_days`
    pub base_pay: Money,
    /// Sum of earning novelties
    pub earnings: Money,
    pub gross_pay: Money,

    pub statutory_deductions: Vec<DeductionLine>,
    /// Sum of deduction novelties
    pub novelty_deductions: Money,
    pub total_deductions: Money,

    pub advances_total: Money,
    pub net_pay: Money,
    /// Advances not covered by this run's net pay
    pub advance_overrun: Money,

    pub novelty_ids: Vec<Uuid>,
    pub advance_ids: Vec<Uuid>,

    #[serde(default)]
    pub warnings: Vec<PayrollWarning>,

    pub calculated_at: DateTime<Utc>,
}

impl PayrollCalculation {
    /// True when this run covers the same employee and period
    pub fn covers(&self, employee_id: Uuid, period: &PayPeriod) -> bool {
        self.employee_id == employee_id && self.period == *period
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
