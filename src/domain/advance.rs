//! Cash advances paid ahead of the regular payroll run

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Money;

/// Money already paid out to an employee, to be subtracted from the net pay
/// of the period it falls in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancePayment {
    pub id: Uuid,

    /// Weak reference; the employee may no longer exist
    pub employee_id: Uuid,

    pub amount: Money,

    pub date: NaiveDate,

    #[serde(default)]
    pub description: String,
}

impl AdvancePayment {
    pub fn new(employee_id: Uuid, amount: Money, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id,
            amount,
            date,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
