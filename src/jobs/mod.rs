//! Scheduled Jobs
//!
//! The worked-days job keeps every employee's tenure current. It ticks once
//! immediately when started and then on a fixed interval, until it is
//! aborted or the state it updates is dropped.

use chrono::{DateTime, Utc};
use std::sync::Weak;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::domain::{to_payroll_time, Employee};

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

// =========================================================================
// Worked days
// =========================================================================

/// Whole days between `created` and `now`, rounded up and never below 1.
///
/// Both instants are taken at the fixed payroll offset (UTC-5), so the
/// result does not depend on the host's timezone. There is no upper cap.
pub fn worked_days(created: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let elapsed = to_payroll_time(now) - to_payroll_time(created);
    let days = ceil_div(elapsed.num_milliseconds(), DAY_MILLIS);
    days.clamp(1, i64::from(u32::MAX)) as u32
}

fn ceil_div(numerator: i64, denominator: i64) -> i64 {
    -((-numerator).div_euclid(denominator))
}

/// Recompute `worked_days` for every employee with a creation date.
///
/// Returns a new roster; employees without `created_date` are copied as is.
pub fn refresh_worked_days(employees: &[Employee], now: DateTime<Utc>) -> Vec<Employee> {
    employees
        .iter()
        .map(|employee| match employee.created_date {
            Some(created) => Employee {
                worked_days: worked_days(created, now),
                ..employee.clone()
            },
            None => employee.clone(),
        })
        .collect()
}

// =========================================================================
// Job
// =========================================================================

/// State the worked-days job writes into
pub trait WorkedDaysTarget: Send + Sync + 'static {
    /// Replace the roster with recomputed worked days. Returns the roster size.
    /// Runs on the blocking pool and may do blocking I/O.
    fn refresh_worked_days(&self, now: DateTime<Utc>) -> usize;
}

/// Configuration for the worked-days job
#[derive(Debug, Clone)]
pub struct WorkedDaysJobConfig {
    /// Interval between recomputations (default: 1 hour)
    pub interval: Duration,
}

impl Default for WorkedDaysJobConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
        }
    }
}

/// Recurring worked-days recomputation
pub struct WorkedDaysJob<T> {
    target: Weak<T>,
    config: WorkedDaysJobConfig,
}

impl<T: WorkedDaysTarget> WorkedDaysJob<T> {
    pub fn new(target: Weak<T>, config: WorkedDaysJobConfig) -> Self {
        Self { target, config }
    }

    /// Start the job on `runtime`.
    /// Returns a handle that must be aborted to cancel the job.
    pub fn start_on(self, runtime: &Handle) -> JoinHandle<()> {
        runtime.spawn(async move {
            self.run().await;
        })
    }

    async fn run(&self) {
        tracing::debug!(interval_secs = self.config.interval.as_secs(), "Worked-days job started");

        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let Some(target) = self.target.upgrade() else {
                tracing::debug!("Worked-days target dropped, stopping job");
                break;
            };

            // The refresh writes to the store, so keep it off the runtime workers
            let refresh =
                tokio::task::spawn_blocking(move || target.refresh_worked_days(Utc::now()));
            match refresh.await {
                Ok(employees) => tracing::debug!(employees = employees, "Worked days recomputed"),
                Err(e) => tracing::error!(error = %e, "Worked-days refresh failed"),
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
