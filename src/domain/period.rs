//! Pay periods
//!
//! Inclusive calendar-date ranges a payroll run covers.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::DomainError;

/// Commercial month length used to prorate salaries.
pub const COMMERCIAL_MONTH_DAYS: u32 = 30;

/// Half of a month for fortnightly payroll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Fortnight {
    /// Days 1 to 15
    First,
    /// Day 16 to month end
    Second,
}

/// Inclusive pay period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PayPeriod {
    /// Create a period, rejecting an end before the start
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if end < start {
            return Err(DomainError::invalid_period(start, end));
        }
        Ok(Self { start, end })
    }

    /// The whole calendar month
    pub fn month(year: i32, month: u32) -> Result<Self, DomainError> {
        let start = first_of_month(year, month)?;
        let end = last_of_month(year, month)?;
        Self::new(start, end)
    }

    /// One half of a calendar month
    pub fn fortnight(year: i32, month: u32, half: Fortnight) -> Result<Self, DomainError> {
        let first = first_of_month(year, month)?;
        let last = last_of_month(year, month)?;
        let fifteenth = first.with_day(15).ok_or_else(|| {
            DomainError::InvalidDate(format!("{}-{:02}-15", year, month))
        })?;

        match half {
            Fortnight::First => Self::new(first, fifteenth),
            Fortnight::Second => Self::new(fifteenth + chrono::Duration::days(1), last),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days, both ends included
    pub fn calendar_days(&self) -> u32 {
        (self.end - self.start).num_days() as u32 + 1
    }

    /// Length used for proration, on a 30-day commercial month.
    ///
    /// A period running to the end of its month counts every month as 30
    /// days long (February included, the 31st ignored); any other period
    /// counts its calendar days, capped at 30.
    pub fn commercial_days(&self) -> u32 {
        let ends_month = self
            .end
            .succ_opt()
            .map_or(true, |next| next.month() != self.end.month());
        let same_month =
            self.start.year() == self.end.year() && self.start.month() == self.end.month();

        if ends_month && same_month {
            COMMERCIAL_MONTH_DAYS + 1 - self.start.day().min(COMMERCIAL_MONTH_DAYS)
        } else {
            self.calendar_days().min(COMMERCIAL_MONTH_DAYS)
        }
    }

    /// Commercial days of this period on or after `from`.
    ///
    /// Starting on any day inside the period earns at least one day.
    pub fn days_from(&self, from: NaiveDate) -> u32 {
        if from > self.end {
            return 0;
        }
        if from <= self.start {
            return self.commercial_days();
        }
        let skipped = (from - self.start).num_days() as u32;
        self.commercial_days().saturating_sub(skipped).max(1)
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, DomainError> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| DomainError::InvalidDate(format!("{}-{:02}", year, month)))
}

fn last_of_month(year: i32, month: u32) -> Result<NaiveDate, DomainError> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    first_of_month(next_year, next_month)?
        .pred_opt()
        .ok_or_else(|| DomainError::InvalidDate(format!("{}-{:02}", year, month)))
}
