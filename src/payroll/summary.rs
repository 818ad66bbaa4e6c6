//! Payroll totals for the preview section

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{PayPeriod, PayrollCalculation};

/// Totals across a set of payroll calculations
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollSummary {
    pub calculations: usize,
    pub gross_pay: Decimal,
    pub total_deductions: Decimal,
    pub advances_total: Decimal,
    pub net_pay: Decimal,
    pub advance_overrun: Decimal,
    /// Calculations carrying at least one warning
    pub with_warnings: usize,
}

impl PayrollSummary {
    /// Totals over every calculation
    pub fn all(calculations: &[PayrollCalculation]) -> Self {
        calculations.iter().fold(Self::default(), Self::accumulate)
    }

    /// Totals over calculations for exactly `period`
    pub fn for_period(calculations: &[PayrollCalculation], period: &PayPeriod) -> Self {
        calculations
            .iter()
            .filter(|c| c.period == *period)
            .fold(Self::default(), Self::accumulate)
    }

    fn accumulate(mut self, calc: &PayrollCalculation) -> Self {
        self.calculations += 1;
        self.gross_pay += calc.gross_pay.value();
        self.total_deductions += calc.total_deductions.value();
        self.advances_total += calc.advances_total.value();
        self.net_pay += calc.net_pay.value();
        self.advance_overrun += calc.advance_overrun.value();
        if calc.has_warnings() {
            self.with_warnings += 1;
        }
        self
    }
}
