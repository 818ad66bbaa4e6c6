//! Application State Coordinator
//!
//! Owns the in-memory collections, persists each one through the repository
//! whenever it changes, runs the worked-days job and hands views their
//! read and write handles.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::domain::{AdvancePayment, Employee, Novelty, PayPeriod, PayrollCalculation};
use crate::error::{AppError, AppResult};
use crate::jobs::{refresh_worked_days, WorkedDaysJob, WorkedDaysJobConfig, WorkedDaysTarget};
use crate::payroll::PayrollCalculator;
use crate::store::{Repository, StorageKey};

use super::state::{Advances, AppState, Employees, Novelties, PayrollCalculations, Slice};
use super::views::View;
use super::Section;

/// Coordinator for the application state
pub struct Coordinator {
    shared: Arc<Shared>,
}

/// State reachable from the worked-days job
struct Shared {
    state: Mutex<AppState>,
    repository: Repository,
    /// Version of the last value written per key, indexed by `key_slot`
    written: [Mutex<u64>; 5],
    next_version: AtomicU64,
    active_section: Mutex<Section>,
    job: Mutex<Option<ArmedJob>>,
}

/// A collection encoded under the state lock, written once it is released
struct PendingWrite {
    key: StorageKey,
    raw: String,
    version: u64,
}

/// Persists the slice it was instantiated for
type Stage = fn(&Shared, &AppState) -> Option<PendingWrite>;

fn key_slot(key: StorageKey) -> usize {
    match key {
        StorageKey::Employees => 0,
        StorageKey::Novelties => 1,
        StorageKey::Advances => 2,
        StorageKey::PayrollCalculations => 3,
        StorageKey::DeductionRates => 4,
    }
}

struct ArmedJob {
    handle: JoinHandle<()>,
    runtime: Handle,
    config: WorkedDaysJobConfig,
    roster_size: usize,
}

/// Outcome of removing an employee
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedEmployee {
    pub employee: Employee,
    /// Novelties removed along with the employee (cascade only)
    pub novelties: Vec<Novelty>,
    /// Advances removed along with the employee (cascade only)
    pub advances: Vec<AdvancePayment>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, AppState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn job(&self) -> MutexGuard<'_, Option<ArmedJob>> {
        self.job.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Encode one slice for writing. Called under the state lock, so
    /// versions follow mutation order.
    fn stage<S: Slice>(&self, state: &AppState) -> Option<PendingWrite> {
        match Repository::encode(S::get(state)) {
            Ok(raw) => Some(PendingWrite {
                key: S::KEY,
                raw,
                version: self.next_version.fetch_add(1, Ordering::SeqCst) + 1,
            }),
            Err(e) => {
                let key = S::KEY;
                tracing::error!(key = %key, error = %e, "Failed to encode collection");
                None
            }
        }
    }

    /// Write staged values with the state lock released. Each key has its own
    /// lock, and a value older than the last one written is dropped. Failures
    /// are logged by the repository; the in-memory value stays authoritative
    /// until the next change.
    fn flush(&self, writes: impl IntoIterator<Item = PendingWrite>) {
        for write in writes {
            let mut written = self.written[key_slot(write.key)]
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if write.version <= *written {
                tracing::debug!(key = %write.key, "Skipping superseded write");
                continue;
            }
            if self.repository.save_encoded(write.key, &write.raw) {
                *written = write.version;
            }
        }
    }
}

impl WorkedDaysTarget for Shared {
    fn refresh_worked_days(&self, now: DateTime<Utc>) -> usize {
        let (write, roster_size) = {
            let mut state = self.state();
            state.employees = refresh_worked_days(&state.employees, now);
            (self.stage::<Employees>(&state), state.employees.len())
        };
        self.flush(write);
        roster_size
    }
}

impl Coordinator {
    /// Hydrate every collection from `repository`
    pub fn open(repository: Repository) -> Self {
        let state = AppState::hydrate(&repository);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                repository,
                written: Default::default(),
                next_version: AtomicU64::new(0),
                active_section: Mutex::new(Section::default()),
                job: Mutex::new(None),
            }),
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.shared.repository
    }

    /// Copy of every collection
    pub fn snapshot(&self) -> AppState {
        self.shared.state().clone()
    }

    // =========================================================================
    // Collections
    // =========================================================================

    /// Current value of one collection
    pub fn get<S: Slice>(&self) -> S::Value {
        S::get(&self.shared.state()).clone()
    }

    /// Run `f` against a copy of one collection. The state is not locked
    /// while `f` runs, so it may use other handles.
    pub fn with<S: Slice, R>(&self, f: impl FnOnce(&S::Value) -> R) -> R {
        f(&self.get::<S>())
    }

    /// Replace one collection and persist it
    pub fn set<S: Slice>(&self, value: S::Value) {
        self.update::<S, _>(|current| *current = value);
    }

    /// Mutate one collection in place and persist it.
    ///
    /// `f` runs with the state locked and must not call back into the
    /// coordinator. The write happens after the lock is released.
    pub fn update<S: Slice, R>(&self, f: impl FnOnce(&mut S::Value) -> R) -> R {
        let (result, write, roster_size) = {
            let mut state = self.shared.state();
            let result = f(S::get_mut(&mut state));
            let write = self.shared.stage::<S>(&state);
            (result, write, S::roster_size(S::get(&state)))
        };
        self.shared.flush(write);

        if let Some(size) = roster_size {
            self.rearm_on_roster_change(size);
        }
        result
    }

    /// Run `f` against the whole state, then persist the slices listed in `persist`.
    fn update_state<R>(&self, f: impl FnOnce(&mut AppState) -> R, persist: &[Stage]) -> R {
        let (result, writes, roster_size) = {
            let mut state = self.shared.state();
            let result = f(&mut state);
            let writes: Vec<PendingWrite> = persist
                .iter()
                .filter_map(|stage| stage(&self.shared, &state))
                .collect();
            (result, writes, state.employees.len())
        };
        self.shared.flush(writes);
        self.rearm_on_roster_change(roster_size);
        result
    }

    // =========================================================================
    // Worked-days job
    // =========================================================================

    /// Start the worked-days job on the current tokio runtime.
    ///
    /// It recomputes immediately, then every `config.interval`. A running
    /// job is replaced.
    pub fn start_worked_days(&self, config: WorkedDaysJobConfig) -> AppResult<()> {
        let runtime = Handle::try_current().map_err(|_| AppError::NoRuntime)?;
        let roster_size = self.with::<Employees, _>(|e| e.len());

        let mut job = self.shared.job();
        if let Some(previous) = job.take() {
            previous.handle.abort();
        }
        *job = Some(self.spawn_job(runtime, config, roster_size));

        tracing::info!(employees = roster_size, "Worked-days job armed");
        Ok(())
    }

    pub fn is_worked_days_running(&self) -> bool {
        self.shared
            .job()
            .as_ref()
            .is_some_and(|job| !job.handle.is_finished())
    }

    /// Recompute worked days now, outside the schedule. Returns the roster size.
    pub fn refresh_worked_days_at(&self, now: DateTime<Utc>) -> usize {
        self.shared.refresh_worked_days(now)
    }

    /// Cancel the worked-days job
    pub fn shutdown(&self) {
        if let Some(job) = self.shared.job().take() {
            job.handle.abort();
            tracing::info!("Worked-days job cancelled");
        }
    }

    fn spawn_job(
        &self,
        runtime: Handle,
        config: WorkedDaysJobConfig,
        roster_size: usize,
    ) -> ArmedJob {
        let handle =
            WorkedDaysJob::new(Arc::downgrade(&self.shared), config.clone()).start_on(&runtime);
        ArmedJob {
            handle,
            runtime,
            config,
            roster_size,
        }
    }

    /// Restart the job when the roster size differs from the armed one.
    /// Edits that keep the size wait for the next tick.
    fn rearm_on_roster_change(&self, roster_size: usize) {
        let mut job = self.shared.job();
        let Some(armed) = job.take() else {
            return;
        };

        if armed.roster_size == roster_size {
            *job = Some(armed);
            return;
        }

        tracing::debug!(
            previous = armed.roster_size,
            current = roster_size,
            "Roster size changed, re-arming worked-days job"
        );
        armed.handle.abort();
        *job = Some(self.spawn_job(armed.runtime, armed.config, roster_size));
    }

    // =========================================================================
    // Sections
    // =========================================================================

    /// Select the active section by name; unknown names select employees
    pub fn select(&self, name: &str) -> Section {
        let section = Section::parse(name);
        *self
            .shared
            .active_section
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = section;
        section
    }

    pub fn active_section(&self) -> Section {
        *self
            .shared
            .active_section
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// View for the active section
    pub fn active_view(&self) -> View<'_> {
        self.view(self.active_section())
    }

    /// View for `section`, holding the handles that section may use
    pub fn view(&self, section: Section) -> View<'_> {
        View::new(self, section)
    }

    // =========================================================================
    // Cross-collection operations
    // =========================================================================

    /// Compute payroll for one employee and period and store it, replacing
    /// any earlier calculation for the same employee and period.
    pub fn calculate_payroll(
        &self,
        employee_id: Uuid,
        period: PayPeriod,
        now: DateTime<Utc>,
    ) -> AppResult<PayrollCalculation> {
        self.update_state(
            |state| -> AppResult<PayrollCalculation> {
                let employee = state
                    .employees
                    .iter()
                    .find(|e| e.id == employee_id)
                    .ok_or(AppError::EmployeeNotFound(employee_id))?;

                let calculation = PayrollCalculator::new(&state.deduction_rates).calculate(
                    employee,
                    &state.novelties,
                    &state.advances,
                    period,
                    now,
                )?;

                state
                    .payroll_calculations
                    .retain(|c| !c.covers(employee_id, &period));
                state.payroll_calculations.push(calculation.clone());

                tracing::info!(
                    employee_id = %employee_id,
                    period = %period,
                    net_pay = %calculation.net_pay,
                    "Payroll calculated"
                );
                Ok(calculation)
            },
            &[Shared::stage::<PayrollCalculations>],
        )
    }

    /// Remove an employee. Novelties and advances referencing it are only
    /// removed when `cascade` is set; payroll history is always kept.
    pub fn remove_employee(&self, employee_id: Uuid, cascade: bool) -> AppResult<RemovedEmployee> {
        let stages: [Stage; 3] = [
            Shared::stage::<Employees>,
            Shared::stage::<Novelties>,
            Shared::stage::<Advances>,
        ];
        let persist = if cascade { &stages[..] } else { &stages[..1] };

        self.update_state(
            |state| -> AppResult<RemovedEmployee> {
                let idx = state
                    .employees
                    .iter()
                    .position(|e| e.id == employee_id)
                    .ok_or(AppError::EmployeeNotFound(employee_id))?;
                let employee = state.employees.remove(idx);

                let (novelties, advances) = if cascade {
                    let (removed_novelties, kept): (Vec<_>, Vec<_>) = state
                        .novelties
                        .drain(..)
                        .partition(|n| n.employee_id == employee_id);
                    state.novelties = kept;

                    let (removed_advances, kept): (Vec<_>, Vec<_>) = state
                        .advances
                        .drain(..)
                        .partition(|a| a.employee_id == employee_id);
                    state.advances = kept;

                    (removed_novelties, removed_advances)
                } else {
                    (Vec::new(), Vec::new())
                };

                tracing::info!(
                    employee_id = %employee_id,
                    novelties = novelties.len(),
                    advances = advances.len(),
                    "Employee removed"
                );
                Ok(RemovedEmployee {
                    employee,
                    novelties,
                    advances,
                })
            },
            persist,
        )
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}
