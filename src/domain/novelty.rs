//! Payroll novelties
//!
//! Dated adjustments tied to one employee: earnings that raise gross pay,
//! deductions that add to the deduction total, and absences that remove days
//! from the period being paid.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DomainError, Money, PayPeriod};

/// Novelty category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoveltyKind {
    Bonus,
    Overtime,
    Commission,
    Deduction,
    Loan,
    Absence,
}

/// How a novelty affects a payroll run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoveltyEffect {
    Earning,
    Deduction,
    Absence,
}

impl NoveltyKind {
    pub fn effect(&self) -> NoveltyEffect {
        match self {
            Self::Bonus | Self::Overtime | Self::Commission => NoveltyEffect::Earning,
            Self::Deduction | Self::Loan => NoveltyEffect::Deduction,
            Self::Absence => NoveltyEffect::Absence,
        }
    }
}

/// A payroll adjustment event for one employee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Novelty {
    pub id: Uuid,

    /// Weak reference; the employee may no longer exist
    pub employee_id: Uuid,

    #[serde(rename = "type")]
    pub kind: NoveltyKind,

    #[serde(default)]
    pub description: String,

    /// Magnitude; the sign comes from `kind`
    #[serde(default)]
    pub amount: Money,

    /// Effective date
    pub date: NaiveDate,

    /// Days not worked (absences only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
}

impl Novelty {
    /// Create an earning or deduction novelty
    pub fn new(
        employee_id: Uuid,
        kind: NoveltyKind,
        amount: Money,
        date: NaiveDate,
    ) -> Result<Self, DomainError> {
        if kind.effect() == NoveltyEffect::Absence {
            return Err(DomainError::MissingField("days"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            employee_id,
            kind,
            description: String::new(),
            amount,
            date,
            days: None,
        })
    }

    /// Create an absence of `days` days starting on `date`
    pub fn absence(employee_id: Uuid, days: u32, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id,
            kind: NoveltyKind::Absence,
            description: String::new(),
            amount: Money::ZERO,
            date,
            days: Some(days),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn effect(&self) -> NoveltyEffect {
        self.kind.effect()
    }

    /// Days removed from the period by this novelty
    pub fn absence_days(&self) -> u32 {
        match self.effect() {
            NoveltyEffect::Absence => self.days.unwrap_or(0),
            _ => 0,
        }
    }

    /// Absence days that fall inside `period`.
    ///
    /// An absence covers `days` consecutive days from `date`; the part running
    /// past `period.end` (or starting before `period.start`) is not counted.
    pub fn absence_days_within(&self, period: &PayPeriod) -> u32 {
        let days = self.absence_days();
        if days == 0 {
            return 0;
        }

        let first = self.date.max(period.start);
        let last = self
            .date
            .checked_add_signed(Duration::days(i64::from(days) - 1))
            .map_or(period.end, |last| last.min(period.end));
        if last < first {
            return 0;
        }

        u32::try_from((last - first).num_days() + 1).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 10).unwrap()
    }

    #[test]
    fn test_kind_effects() {
        assert_eq!(NoveltyKind::Bonus.effect(), NoveltyEffect::Earning);
        assert_eq!(NoveltyKind::Overtime.effect(), NoveltyEffect::Earning);
        assert_eq!(NoveltyKind::Loan.effect(), NoveltyEffect::Deduction);
        assert_eq!(NoveltyKind::Absence.effect(), NoveltyEffect::Absence);
    }

    #[test]
    fn test_absence_requires_days_constructor() {
        let result = Novelty::new(Uuid::new_v4(), NoveltyKind::Absence, Money::ZERO, date());
        assert_eq!(result, Err(DomainError::MissingField("days")));

        let absence = Novelty::absence(Uuid::new_v4(), 3, date());
        assert_eq!(absence.absence_days(), 3);
    }

    #[test]
    fn test_earning_has_no_absence_days() {
        let bonus = Novelty::new(
            Uuid::new_v4(),
            NoveltyKind::Bonus,
            Money::new(dec!(50000)).unwrap(),
            date(),
        )
        .unwrap();
        assert_eq!(bonus.absence_days(), 0);
    }

    #[test]
    fn test_absence_clamped_to_period() {
        let october = PayPeriod::month(2026, 10).unwrap();
        let id = Uuid::new_v4();
        let on = |d: u32| NaiveDate::from_ymd_opt(2026, 10, d).unwrap();

        assert_eq!(Novelty::absence(id, 3, on(20)).absence_days_within(&october), 3);
        // Runs into November: only Oct 29, 30, 31 count
        assert_eq!(Novelty::absence(id, 10, on(29)).absence_days_within(&october), 3);
        assert_eq!(Novelty::absence(id, u32::MAX, on(1)).absence_days_within(&october), 31);

        let september = NaiveDate::from_ymd_opt(2026, 9, 28).unwrap();
        assert_eq!(Novelty::absence(id, 5, september).absence_days_within(&october), 2);
        assert_eq!(Novelty::absence(id, 2, september).absence_days_within(&october), 0);
    }

    #[test]
    fn test_kind_serialized_as_type() {
        let bonus = Novelty::new(Uuid::new_v4(), NoveltyKind::Bonus, Money::ZERO, date())
            .unwrap()
            .with_description("Q3 target");
        let json = serde_json::to_value(&bonus).unwrap();

        assert_eq!(json["type"], "bonus");
        assert_eq!(json["description"], "Q3 target");
        assert!(json.get("employeeId").is_some());
        assert!(json.get("days").is_none());
    }
}
