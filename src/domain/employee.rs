//! Employee records

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DomainError, Money};

/// Fixed payroll timezone offset from UTC, in hours (UTC-5).
///
/// Dates derived from instants (hire dates, worked days) are computed at this
/// offset regardless of the host's local timezone.
pub const PAYROLL_UTC_OFFSET_HOURS: i64 = -5;

/// Shift an instant into the payroll timezone's wall clock.
pub fn to_payroll_time(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant + Duration::hours(PAYROLL_UTC_OFFSET_HOURS)
}

/// An employee on the payroll roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,

    pub name: String,

    /// National identity document
    #[serde(default)]
    pub document_number: String,

    #[serde(default)]
    pub position: String,

    /// Monthly base salary
    pub base_salary: Money,

    /// When the employee record was created (hire instant)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,

    /// Tenure in days, derived from `created_date`; never edited by hand
    #[serde(default = "default_worked_days")]
    pub worked_days: u32,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_worked_days() -> u32 {
    1
}

fn default_active() -> bool {
    true
}

impl Employee {
    /// Create a new employee hired at `created_date`
    pub fn new(
        name: impl Into<String>,
        base_salary: Money,
        created_date: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::MissingField("name"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            document_number: String::new(),
            position: String::new(),
            base_salary,
            created_date: Some(created_date),
            worked_days: 1,
            is_active: true,
        })
    }

    pub fn with_document_number(mut self, document_number: impl Into<String>) -> Self {
        self.document_number = document_number.into();
        self
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = position.into();
        self
    }

    /// Calendar date of hire in the payroll timezone, if known
    pub fn hire_date(&self) -> Option<NaiveDate> {
        self.created_date
            .map(|created| to_payroll_time(created).date_naive())
    }
}
