//! Payroll Calculator
//!
//! Computes a `PayrollCalculation` for one employee and one period.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{
    AdvancePayment, DeductionLine, DeductionRates, DomainError, Employee, Money, Novelty,
    NoveltyEffect, PayPeriod, PayrollCalculation, PayrollWarning, RateBase, RateEntry, RateKind,
    COMMERCIAL_MONTH_DAYS,
};

use super::PayrollError;

/// Calculator bound to a deduction rate table
#[derive(Debug, Clone, Copy)]
pub struct PayrollCalculator<'a> {
    rates: &'a DeductionRates,
}

impl<'a> PayrollCalculator<'a> {
    pub fn new(rates: &'a DeductionRates) -> Self {
        Self { rates }
    }

    /// Compute payroll for `employee` over `period`.
    ///
    /// `novelties` and `advances` may hold records for any employee and date;
    /// only those referencing this employee and dated inside the period are
    /// used and recorded in the snapshot.
    pub fn calculate(
        &self,
        employee: &Employee,
        novelties: &[Novelty],
        advances: &[AdvancePayment],
        period: PayPeriod,
        calculated_at: DateTime<Utc>,
    ) -> Result<PayrollCalculation, PayrollError> {
        if period.end < period.start {
            return Err(DomainError::invalid_period(period.start, period.end).into());
        }

        let novelties: Vec<&Novelty> = novelties
            .iter()
            .filter(|n| n.employee_id == employee.id && period.contains(n.date))
            .collect();
        let advances: Vec<&AdvancePayment> = advances
            .iter()
            .filter(|a| a.employee_id == employee.id && period.contains(a.date))
            .collect();

        let mut warnings = Vec::new();

        // Worked days
        let available_days = match employee.hire_date() {
            Some(hired) => period.days_from(hired),
            None => period.commercial_days(),
        };
        let absence_days = novelties
            .iter()
            .map(|n| n.absence_days_within(&period))
            .fold(0u32, u32::saturating_add);
        let worked_days = available_days.saturating_sub(absence_days);

        // Gross
        let (base_pay, earnings) = if worked_days == 0 {
            warnings.push(PayrollWarning::NoWorkedDays);
            (Money::ZERO, Money::ZERO)
        } else {
            let prorated = employee.base_salary.value() * Decimal::from(worked_days)
                / Decimal::from(COMMERCIAL_MONTH_DAYS);
            let earnings: Decimal = novelties
                .iter()
                .filter(|n| n.effect() == NoveltyEffect::Earning)
                .map(|n| &n.amount)
                .sum();
            (Money::rounded(prorated)?, Money::new(earnings)?)
        };
        let gross_pay = base_pay.try_add(&earnings)?;

        // Deductions
        let statutory_deductions = self.statutory_deductions(&gross_pay, &mut warnings);
        let statutory_total: Decimal = statutory_deductions.iter().map(|l| &l.amount).sum();
        let novelty_deductions: Decimal = novelties
            .iter()
            .filter(|n| n.effect() == NoveltyEffect::Deduction)
            .map(|n| &n.amount)
            .sum();
        let novelty_deductions = Money::new(novelty_deductions)?;
        let total_deductions = Money::new(statutory_total)?.try_add(&novelty_deductions)?;

        // Net
        let (net_before_advances, deduction_excess) = gross_pay.saturating_sub(&total_deductions);
        if !deduction_excess.is_zero() {
            warnings.push(PayrollWarning::DeductionsExceedGross {
                excess: deduction_excess,
            });
        }

        let advances_total: Decimal = advances.iter().map(|a| &a.amount).sum();
        let advances_total = Money::new(advances_total)?;
        let (net_pay, advance_overrun) = net_before_advances.saturating_sub(&advances_total);
        if !advance_overrun.is_zero() {
            warnings.push(PayrollWarning::AdvanceOverrun {
                amount: advance_overrun,
            });
        }

        if !warnings.is_empty() {
            tracing::warn!(
                employee_id = %employee.id,
                period = %period,
                warnings = warnings.len(),
                "Payroll calculated with warnings"
            );
        }

        Ok(PayrollCalculation {
            id: Uuid::new_v4(),
            employee_id: employee.id,
            employee_name: employee.name.clone(),
            period,
            worked_days,
            base_pay,
            earnings,
            gross_pay,
            statutory_deductions,
            novelty_deductions,
            total_deductions,
            advances_total,
            net_pay,
            advance_overrun,
            novelty_ids: novelties.iter().map(|n| n.id).collect(),
            advance_ids: advances.iter().map(|a| a.id).collect(),
            warnings,
            calculated_at,
        })
    }

    /// One line per rate entry. Missing and malformed entries count as zero
    /// and are reported through `warnings`.
    fn statutory_deductions(
        &self,
        gross: &Money,
        warnings: &mut Vec<PayrollWarning>,
    ) -> Vec<DeductionLine> {
        for name in self.rates.missing_required() {
            warnings.push(PayrollWarning::MissingRate {
                name: name.to_string(),
            });
        }

        let mut lines =
            Vec::with_capacity(self.rates.entries.len() + self.rates.unreadable.len());
        for entry in &self.rates.entries {
            let applied = entry
                .validate()
                .and_then(|()| apply_rate(entry, gross).map_err(|e| e.to_string()));
            let line = match applied {
                Ok(line) => line,
                Err(reason) => skip_malformed(&entry.name, reason, warnings),
            };
            lines.push(line);
        }

        for unreadable in &self.rates.unreadable {
            lines.push(skip_malformed(
                &unreadable.name,
                unreadable.reason.clone(),
                warnings,
            ));
        }

        lines
    }
}

/// Zero line for an entry that cannot be applied, reported as a warning
fn skip_malformed(name: &str, reason: String, warnings: &mut Vec<PayrollWarning>) -> DeductionLine {
    tracing::warn!(rate = %name, %reason, "Skipping malformed deduction rate");
    warnings.push(PayrollWarning::MalformedRate {
        name: name.to_string(),
        reason,
    });
    DeductionLine {
        name: name.to_string(),
        base: Money::ZERO,
        amount: Money::ZERO,
    }
}

/// Apply a validated entry to gross pay
fn apply_rate(entry: &RateEntry, gross: &Money) -> Result<DeductionLine, PayrollError> {
    let base = match entry.base {
        RateBase::Gross => *gross,
        RateBase::Capped { cap } => Money::rounded(gross.value().min(cap))?,
    };

    let amount = match entry.kind {
        RateKind::Percentage => Money::rounded(base.value() * entry.value / Decimal::ONE_HUNDRED)?,
        RateKind::Fixed if base.is_zero() => Money::ZERO,
        RateKind::Fixed => Money::rounded(entry.value)?,
    };

    Ok(DeductionLine {
        name: entry.name.clone(),
        base,
        amount,
    })
}
