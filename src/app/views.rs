//! Section views
//!
//! Each section gets read handles on the collections it displays and write
//! handles on the ones it may change. Handles borrow the coordinator, so
//! every write goes through its persistence path.

use chrono::{DateTime, Utc};
use std::marker::PhantomData;
use uuid::Uuid;

use crate::domain::{AdvancePayment, Employee, Novelty, PayPeriod, PayrollCalculation, RateEntry};
use crate::error::{AppError, AppResult};
use crate::payroll::PayrollSummary;

use super::state::{Advances, Employees, Novelties, PayrollCalculations, Rates, Slice};
use super::{Coordinator, Section};

/// Read access to one collection
pub struct Reader<'a, S: Slice> {
    coordinator: &'a Coordinator,
    _slice: PhantomData<S>,
}

/// Read and write access to one collection
pub struct Writer<'a, S: Slice> {
    coordinator: &'a Coordinator,
    _slice: PhantomData<S>,
}

impl<'a, S: Slice> Reader<'a, S> {
    fn new(coordinator: &'a Coordinator) -> Self {
        Self {
            coordinator,
            _slice: PhantomData,
        }
    }

    pub fn get(&self) -> S::Value {
        self.coordinator.get::<S>()
    }

    pub fn with<R>(&self, f: impl FnOnce(&S::Value) -> R) -> R {
        self.coordinator.with::<S, R>(f)
    }
}

impl<'a, S: Slice> Writer<'a, S> {
    fn new(coordinator: &'a Coordinator) -> Self {
        Self {
            coordinator,
            _slice: PhantomData,
        }
    }

    pub fn get(&self) -> S::Value {
        self.coordinator.get::<S>()
    }

    pub fn with<R>(&self, f: impl FnOnce(&S::Value) -> R) -> R {
        self.coordinator.with::<S, R>(f)
    }

    /// Replace the collection
    pub fn set(&self, value: S::Value) {
        self.coordinator.set::<S>(value)
    }

    /// Change the collection in place. `f` runs with the state locked and
    /// must not use other handles.
    pub fn update<R>(&self, f: impl FnOnce(&mut S::Value) -> R) -> R {
        self.coordinator.update::<S, R>(f)
    }

    /// Downgrade to read access
    pub fn reader(&self) -> Reader<'a, S> {
        Reader::new(self.coordinator)
    }
}

/// The view handed to a section
pub enum View<'a> {
    Employees(EmployeesView<'a>),
    Novelties(NoveltiesView<'a>),
    Advances(AdvancesView<'a>),
    Calculator(CalculatorView<'a>),
    Preview(PreviewView<'a>),
    Settings(SettingsView<'a>),
}

impl<'a> View<'a> {
    pub(super) fn new(coordinator: &'a Coordinator, section: Section) -> Self {
        match section {
            Section::Employees => View::Employees(EmployeesView {
                employees: Writer::new(coordinator),
            }),
            Section::Novelties => View::Novelties(NoveltiesView {
                employees: Writer::new(coordinator),
                novelties: Writer::new(coordinator),
            }),
            Section::Advances => View::Advances(AdvancesView {
                employees: Reader::new(coordinator),
                advances: Writer::new(coordinator),
            }),
            Section::Calculator => View::Calculator(CalculatorView {
                coordinator,
                employees: Reader::new(coordinator),
                novelties: Reader::new(coordinator),
                advances: Reader::new(coordinator),
                deduction_rates: Reader::new(coordinator),
                payroll_calculations: Writer::new(coordinator),
            }),
            Section::Preview => View::Preview(PreviewView {
                payroll_calculations: Reader::new(coordinator),
                advances: Reader::new(coordinator),
            }),
            Section::Settings => View::Settings(SettingsView {
                deduction_rates: Writer::new(coordinator),
            }),
        }
    }

    pub fn section(&self) -> Section {
        match self {
            View::Employees(_) => Section::Employees,
            View::Novelties(_) => Section::Novelties,
            View::Advances(_) => Section::Advances,
            View::Calculator(_) => Section::Calculator,
            View::Preview(_) => Section::Preview,
            View::Settings(_) => Section::Settings,
        }
    }
}

fn employee_exists(employees: &[Employee], employee_id: Uuid) -> AppResult<()> {
    if employees.iter().any(|e| e.id == employee_id) {
        Ok(())
    } else {
        Err(AppError::EmployeeNotFound(employee_id))
    }
}

// =========================================================================
// Employees
// =========================================================================

pub struct EmployeesView<'a> {
    pub employees: Writer<'a, Employees>,
}

impl EmployeesView<'_> {
    pub fn add(&self, employee: Employee) {
        self.employees.update(|list| list.push(employee));
    }

    /// Replace the stored record with the same id
    pub fn replace(&self, employee: Employee) -> AppResult<()> {
        let id = employee.id;
        self.employees.update(|list| {
            let slot = list
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or(AppError::EmployeeNotFound(id))?;
            *slot = employee;
            Ok(())
        })
    }

    /// Remove the employee record only; see `Coordinator::remove_employee`
    /// to also drop its novelties and advances.
    pub fn remove(&self, employee_id: Uuid) -> AppResult<Employee> {
        self.employees.update(|list| {
            let idx = list
                .iter()
                .position(|e| e.id == employee_id)
                .ok_or(AppError::EmployeeNotFound(employee_id))?;
            Ok(list.remove(idx))
        })
    }
}

// =========================================================================
// Novelties
// =========================================================================

pub struct NoveltiesView<'a> {
    pub employees: Writer<'a, Employees>,
    pub novelties: Writer<'a, Novelties>,
}

impl NoveltiesView<'_> {
    /// Record a novelty for an existing employee
    pub fn add(&self, novelty: Novelty) -> AppResult<()> {
        self.employees
            .with(|employees| employee_exists(employees, novelty.employee_id))?;
        self.novelties.update(|list| list.push(novelty));
        Ok(())
    }

    pub fn remove(&self, novelty_id: Uuid) -> Option<Novelty> {
        self.novelties.update(|list| {
            let idx = list.iter().position(|n| n.id == novelty_id)?;
            Some(list.remove(idx))
        })
    }

    pub fn for_employee(&self, employee_id: Uuid) -> Vec<Novelty> {
        self.novelties.with(|list| {
            list.iter()
                .filter(|n| n.employee_id == employee_id)
                .cloned()
                .collect()
        })
    }
}

// =========================================================================
// Advances
// =========================================================================

pub struct AdvancesView<'a> {
    pub employees: Reader<'a, Employees>,
    pub advances: Writer<'a, Advances>,
}

impl AdvancesView<'_> {
    /// Record an advance for an existing employee
    pub fn add(&self, advance: AdvancePayment) -> AppResult<()> {
        self.employees
            .with(|employees| employee_exists(employees, advance.employee_id))?;
        self.advances.update(|list| list.push(advance));
        Ok(())
    }

    pub fn remove(&self, advance_id: Uuid) -> Option<AdvancePayment> {
        self.advances.update(|list| {
            let idx = list.iter().position(|a| a.id == advance_id)?;
            Some(list.remove(idx))
        })
    }

    pub fn for_employee(&self, employee_id: Uuid) -> Vec<AdvancePayment> {
        self.advances.with(|list| {
            list.iter()
                .filter(|a| a.employee_id == employee_id)
                .cloned()
                .collect()
        })
    }
}

// =========================================================================
// Calculator
// =========================================================================

pub struct CalculatorView<'a> {
    coordinator: &'a Coordinator,
    pub employees: Reader<'a, Employees>,
    pub novelties: Reader<'a, Novelties>,
    pub advances: Reader<'a, Advances>,
    pub deduction_rates: Reader<'a, Rates>,
    pub payroll_calculations: Writer<'a, PayrollCalculations>,
}

impl CalculatorView<'_> {
    /// Calculate and store payroll for one employee
    pub fn calculate(&self, employee_id: Uuid, period: PayPeriod) -> AppResult<PayrollCalculation> {
        self.calculate_at(employee_id, period, Utc::now())
    }

    pub fn calculate_at(
        &self,
        employee_id: Uuid,
        period: PayPeriod,
        now: DateTime<Utc>,
    ) -> AppResult<PayrollCalculation> {
        self.coordinator.calculate_payroll(employee_id, period, now)
    }

    /// Calculate and store payroll for every active employee
    pub fn calculate_all(
        &self,
        period: PayPeriod,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<PayrollCalculation>> {
        let active: Vec<Uuid> = self.employees.with(|employees| {
            employees
                .iter()
                .filter(|e| e.is_active)
                .map(|e| e.id)
                .collect()
        });

        active
            .into_iter()
            .map(|id| self.calculate_at(id, period, now))
            .collect()
    }

    /// Delete the stored calculation for an employee and period
    pub fn discard(&self, employee_id: Uuid, period: &PayPeriod) -> bool {
        self.payroll_calculations.update(|list| {
            let before = list.len();
            list.retain(|c| !c.covers(employee_id, period));
            list.len() != before
        })
    }
}

// =========================================================================
// Preview
// =========================================================================

pub struct PreviewView<'a> {
    pub payroll_calculations: Reader<'a, PayrollCalculations>,
    pub advances: Reader<'a, Advances>,
}

impl PreviewView<'_> {
    pub fn for_period(&self, period: &PayPeriod) -> Vec<PayrollCalculation> {
        self.payroll_calculations.with(|list| {
            list.iter()
                .filter(|c| c.period == *period)
                .cloned()
                .collect()
        })
    }

    pub fn summary(&self, period: &PayPeriod) -> PayrollSummary {
        self.payroll_calculations
            .with(|list| PayrollSummary::for_period(list, period))
    }

    /// Advances a calculation subtracted, as currently stored
    pub fn advances_for(&self, calculation: &PayrollCalculation) -> Vec<AdvancePayment> {
        self.advances.with(|list| {
            list.iter()
                .filter(|a| calculation.advance_ids.contains(&a.id))
                .cloned()
                .collect()
        })
    }
}

// =========================================================================
// Settings
// =========================================================================

pub struct SettingsView<'a> {
    pub deduction_rates: Writer<'a, Rates>,
}

impl SettingsView<'_> {
    pub fn set_rate(&self, entry: RateEntry) {
        tracing::info!(rate = %entry.name, value = %entry.value, "Deduction rate updated");
        self.deduction_rates.update(|rates| rates.set(entry));
    }

    pub fn remove_rate(&self, name: &str) -> Option<RateEntry> {
        self.deduction_rates.update(|rates| rates.remove(name))
    }

    pub fn reset_to_defaults(&self) {
        self.deduction_rates.set(Default::default());
    }
}
