//! Application state
//!
//! The five in-memory collections, and the `Slice` markers that name each one
//! together with its storage key.

use serde::{de::DeserializeOwned, Serialize};

use crate::domain::{AdvancePayment, DeductionRates, Employee, Novelty, PayrollCalculation};
use crate::store::{Repository, StorageKey};

/// Every collection the application holds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub employees: Vec<Employee>,
    pub novelties: Vec<Novelty>,
    pub advances: Vec<AdvancePayment>,
    pub payroll_calculations: Vec<PayrollCalculation>,
    pub deduction_rates: DeductionRates,
}

impl AppState {
    /// Load every collection from `repository`, each on its own.
    ///
    /// A key that is absent or unreadable keeps its default without
    /// affecting the others.
    pub fn hydrate(repository: &Repository) -> Self {
        let mut state = Self::default();
        hydrate_slice::<Employees>(repository, &mut state);
        hydrate_slice::<Novelties>(repository, &mut state);
        hydrate_slice::<Advances>(repository, &mut state);
        hydrate_slice::<PayrollCalculations>(repository, &mut state);
        hydrate_slice::<Rates>(repository, &mut state);

        tracing::info!(
            employees = state.employees.len(),
            novelties = state.novelties.len(),
            advances = state.advances.len(),
            payroll_calculations = state.payroll_calculations.len(),
            rate_entries = state.deduction_rates.entries.len(),
            "State hydrated"
        );
        state
    }
}

fn hydrate_slice<S: Slice>(repository: &Repository, state: &mut AppState) {
    if let Some(value) = repository.load::<S::Value>(S::KEY) {
        *S::get_mut(state) = value;
    }
}

/// One persisted collection of `AppState`
pub trait Slice: Send + Sync + 'static {
    type Value: Clone + Serialize + DeserializeOwned + Send;

    const KEY: StorageKey;

    fn get(state: &AppState) -> &Self::Value;

    fn get_mut(state: &mut AppState) -> &mut Self::Value;

    /// Roster size, for the slice the worked-days job follows
    fn roster_size(_value: &Self::Value) -> Option<usize> {
        None
    }
}

pub struct Employees;
pub struct Novelties;
pub struct Advances;
pub struct PayrollCalculations;
pub struct Rates;

impl Slice for Employees {
    type Value = Vec<Employee>;
    const KEY: StorageKey = StorageKey::Employees;

    fn get(state: &AppState) -> &Self::Value {
        &state.employees
    }

    fn get_mut(state: &mut AppState) -> &mut Self::Value {
        &mut state.employees
    }

    fn roster_size(value: &Self::Value) -> Option<usize> {
        Some(value.len())
    }
}

impl Slice for Novelties {
    type Value = Vec<Novelty>;
    const KEY: StorageKey = StorageKey::Novelties;

    fn get(state: &AppState) -> &Self::Value {
        &state.novelties
    }

    fn get_mut(state: &mut AppState) -> &mut Self::Value {
        &mut state.novelties
    }
}

impl Slice for Advances {
    type Value = Vec<AdvancePayment>;
    const KEY: StorageKey = StorageKey::Advances;

    fn get(state: &AppState) -> &Self::Value {
        &state.advances
    }

    fn get_mut(state: &mut AppState) -> &mut Self::Value {
        &mut state.advances
    }
}

impl Slice for PayrollCalculations {
    type Value = Vec<PayrollCalculation>;
    const KEY: StorageKey = StorageKey::PayrollCalculations;

    fn get(state: &AppState) -> &Self::Value {
        &state.payroll_calculations
    }

    fn get_mut(state: &mut AppState) -> &mut Self::Value {
        &mut state.payroll_calculations
    }
}

impl Slice for Rates {
    type Value = DeductionRates;
    const KEY: StorageKey = StorageKey::DeductionRates;

    fn get(state: &AppState) -> &Self::Value {
        &state.deduction_rates
    }

    fn get_mut(state: &mut AppState) -> &mut Self::Value {
        &mut state.deduction_rates
    }
}
