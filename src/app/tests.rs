//! Coordinator tests
//!
//! Run against `MemoryStore`, so every persisted write can be inspected.

#[cfg(test)]
mod tests {
    use crate::app::{
        Advances, Coordinator, Employees, Novelties, PayrollCalculations, Rates, Section, View,
    };
    use crate::domain::{
        AdvancePayment, DeductionRates, Employee, Money, Novelty, NoveltyKind, PayPeriod,
        RateEntry,
    };
    use crate::error::AppError;
    use crate::jobs::WorkedDaysJobConfig;
    use crate::domain::PayrollWarning;
    use crate::store::{KeyValueStore, MemoryStore, Repository, StorageKey, StoreError};
    use chrono::{Duration as ChronoDuration, NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use std::sync::{mpsc, Arc, Mutex};
    use std::time::Duration;
    use uuid::Uuid;

    fn coordinator() -> (Coordinator, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let coordinator = Coordinator::open(Repository::new(store.clone()));
        (coordinator, store)
    }

    fn employee(name: &str, days_ago: i64) -> Employee {
        // One hour short of whole days, so a later `now` still rounds to `days_ago`
        let created = Utc::now() - ChronoDuration::days(days_ago) + ChronoDuration::hours(1);
        Employee::new(name, Money::new(dec!(1000000)).unwrap(), created).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // =========================================================================
    // Hydration and persistence
    // =========================================================================

    #[test]
    fn test_empty_store_uses_defaults() {
        let (coordinator, _) = coordinator();
        let state = coordinator.snapshot();

        assert!(state.employees.is_empty());
        assert!(state.payroll_calculations.is_empty());
        assert_eq!(state.deduction_rates, DeductionRates::default());
    }

    #[test]
    fn test_set_persists_only_its_key() {
        let (coordinator, store) = coordinator();
        coordinator.set::<Employees>(vec![employee("Ana", 3)]);

        assert!(store.raw("employees").is_some());
        assert!(store.raw("novelties").is_none());
        assert!(store.raw("deductionRates").is_none());
    }

    #[test]
    fn test_corrupt_key_does_not_affect_others() {
        let store = Arc::new(MemoryStore::new());
        let repository = Repository::new(store.clone());
        let ana = employee("Ana", 3);
        repository
            .try_save(StorageKey::Employees, &vec![ana.clone()])
            .unwrap();
        store.insert_raw("novelties", "[{\"broken\":");
        store.insert_raw("deductionRates", "42");

        let coordinator = Coordinator::open(repository);
        let state = coordinator.snapshot();

        assert_eq!(state.employees, vec![ana]);
        assert!(state.novelties.is_empty());
        assert_eq!(state.deduction_rates, DeductionRates::default());
    }

    #[test]
    fn test_unreadable_rate_keeps_rest_of_table() {
        let store = Arc::new(MemoryStore::new());
        store.insert_raw(
            "deductionRates",
            r#"{"entries":[
                {"name":"health","kind":"percentage","value":"0"},
                {"name":"pension","kind":"percentage","value":"0"},
                {"name":"union","kind":"flatFee","value":"5000"}
            ]}"#,
        );
        let coordinator = Coordinator::open(Repository::new(store));

        let rates = coordinator.get::<Rates>();
        assert_eq!(rates.get("health").unwrap().value, dec!(0));
        assert_eq!(rates.get("pension").unwrap().value, dec!(0));
        assert_eq!(rates.unreadable.len(), 1);

        let hired = Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap();
        let ana = Employee::new("Ana", Money::new(dec!(1000000)).unwrap(), hired).unwrap();
        coordinator.set::<Employees>(vec![ana.clone()]);
        let calc = coordinator
            .calculate_payroll(ana.id, PayPeriod::month(2026, 10).unwrap(), Utc::now())
            .unwrap();

        assert!(calc.total_deductions.is_zero());
        assert!(calc
            .warnings
            .iter()
            .any(|w| matches!(w, PayrollWarning::MalformedRate { name, .. } if name == "union")));
    }

    /// Memory store whose next write to one key blocks until released
    struct GatedStore {
        inner: MemoryStore,
        gate: Mutex<Option<(String, mpsc::Sender<()>, mpsc::Receiver<()>)>>,
    }

    impl GatedStore {
        fn new() -> Self {
            Self {
                inner: MemoryStore::new(),
                gate: Mutex::new(None),
            }
        }

        /// Returns (entered, release)
        fn hold(&self, key: &str) -> (mpsc::Receiver<()>, mpsc::Sender<()>) {
            let (entered_tx, entered_rx) = mpsc::channel();
            let (release_tx, release_rx) = mpsc::channel();
            *self.gate.lock().unwrap() = Some((key.to_string(), entered_tx, release_rx));
            (entered_rx, release_tx)
        }
    }

    impl KeyValueStore for GatedStore {
        fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get_item(key)
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
            let gate = {
                let mut gate = self.gate.lock().unwrap();
                if gate.as_ref().is_some_and(|(k, _, _)| k == key) {
                    gate.take()
                } else {
                    None
                }
            };
            if let Some((_, entered, release)) = gate {
                entered.send(()).unwrap();
                release.recv().unwrap();
            }
            self.inner.set_item(key, value)
        }
    }

    #[test]
    fn test_slow_write_does_not_block_state_or_other_keys() {
        let store = Arc::new(GatedStore::new());
        let coordinator = Arc::new(Coordinator::open(Repository::new(store.clone())));
        let (entered, release) = store.hold("employees");

        let writer = {
            let coordinator = coordinator.clone();
            std::thread::spawn(move || coordinator.set::<Employees>(vec![employee("Ana", 3)]))
        };
        entered.recv_timeout(Duration::from_secs(5)).unwrap();

        // Employees write is in flight
        assert_eq!(coordinator.get::<Employees>().len(), 1);
        coordinator.set::<Rates>(DeductionRates::empty());
        assert!(store.inner.raw("deductionRates").is_some());
        assert!(store.inner.raw("employees").is_none());

        release.send(()).unwrap();
        writer.join().unwrap();
        assert!(store.inner.raw("employees").is_some());
    }

    #[test]
    fn test_handles_can_be_used_inside_with() {
        let (coordinator, store) = coordinator();
        let ana = employee("Ana", 3);
        coordinator.set::<Employees>(vec![ana.clone()]);

        let View::Novelties(view) = coordinator.view(Section::Novelties) else {
            panic!("expected novelties view");
        };
        view.employees.with(|employees| {
            let absence = Novelty::absence(employees[0].id, 1, date(2026, 10, 2));
            view.novelties.update(|list| list.push(absence));
            assert!(view.employees.get().len() == 1);
        });

        assert_eq!(coordinator.get::<Novelties>().len(), 1);
        assert!(store.raw("novelties").is_some());
        assert_eq!(coordinator.get::<Novelties>()[0].employee_id, ana.id);
    }

    #[test]
    fn test_failed_save_keeps_memory_and_retries_on_next_change() {
        let (coordinator, store) = coordinator();
        store.set_reject_writes(true);

        coordinator.set::<Employees>(vec![employee("Ana", 3)]);
        assert_eq!(coordinator.get::<Employees>().len(), 1);
        assert!(store.raw("employees").is_none());

        store.set_reject_writes(false);
        coordinator.update::<Employees, _>(|list| list.push(employee("Luis", 1)));

        let stored: Vec<Employee> = serde_json::from_str(&store.raw("employees").unwrap()).unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[test]
    fn test_reopen_restores_state() {
        let store = Arc::new(MemoryStore::new());
        let first = Coordinator::open(Repository::new(store.clone()));
        let ana = employee("Ana", 3);
        first.set::<Employees>(vec![ana.clone()]);
        first.set::<Rates>(DeductionRates::default().with(RateEntry::percentage("health", dec!(5))));
        let expected = first.snapshot();
        drop(first);

        let second = Coordinator::open(Repository::new(store));
        assert_eq!(second.snapshot(), expected);
    }

    // =========================================================================
    // Sections and views
    // =========================================================================

    #[test]
    fn test_unknown_section_dispatches_employee_view() {
        let (coordinator, _) = coordinator();

        assert_eq!(coordinator.select("payslips"), Section::Employees);
        assert!(matches!(coordinator.active_view(), View::Employees(_)));

        coordinator.select("settings");
        assert_eq!(coordinator.active_view().section(), Section::Settings);
    }

    #[test]
    fn test_every_section_has_a_view() {
        let (coordinator, _) = coordinator();
        for section in Section::ALL {
            assert_eq!(coordinator.view(section).section(), section);
        }
    }

    #[test]
    fn test_novelty_for_unknown_employee_rejected() {
        let (coordinator, _) = coordinator();
        let View::Novelties(view) = coordinator.view(Section::Novelties) else {
            panic!("expected novelties view");
        };

        let novelty = Novelty::new(
            Uuid::new_v4(),
            NoveltyKind::Bonus,
            Money::ZERO,
            date(2026, 10, 1),
        )
        .unwrap();

        assert!(matches!(view.add(novelty), Err(AppError::EmployeeNotFound(_))));
        assert!(coordinator.get::<Novelties>().is_empty());
    }

    #[test]
    fn test_calculator_replaces_same_period() {
        let (coordinator, store) = coordinator();
        let hired = Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap();
        let ana = Employee::new("Ana", Money::new(dec!(1000000)).unwrap(), hired).unwrap();
        coordinator.set::<Employees>(vec![ana.clone()]);

        let View::Advances(advances) = coordinator.view(Section::Advances) else {
            panic!("expected advances view");
        };
        advances
            .add(AdvancePayment::new(
                ana.id,
                Money::new(dec!(100000)).unwrap(),
                date(2026, 10, 12),
            ))
            .unwrap();

        let View::Calculator(calculator) = coordinator.view(Section::Calculator) else {
            panic!("expected calculator view");
        };
        let october = PayPeriod::month(2026, 10).unwrap();
        let first = calculator.calculate(ana.id, october).unwrap();
        let second = calculator.calculate(ana.id, october).unwrap();

        let stored = coordinator.get::<PayrollCalculations>();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, second.id);
        assert_ne!(first.id, second.id);
        assert_eq!(second.net_pay.value(), dec!(820000));
        assert!(store.raw("payrollCalculations").is_some());
    }

    #[test]
    fn test_calculate_unknown_employee() {
        let (coordinator, _) = coordinator();
        let october = PayPeriod::month(2026, 10).unwrap();
        let result = coordinator.calculate_payroll(Uuid::new_v4(), october, Utc::now());
        assert!(matches!(result, Err(AppError::EmployeeNotFound(_))));
    }

    #[test]
    fn test_settings_view_updates_rates() {
        let (coordinator, _) = coordinator();
        let View::Settings(settings) = coordinator.view(Section::Settings) else {
            panic!("expected settings view");
        };

        settings.set_rate(RateEntry::fixed("union", dec!(12000)));
        assert!(coordinator.get::<Rates>().get("union").is_some());

        settings.remove_rate("health");
        assert_eq!(coordinator.get::<Rates>().missing_required(), vec!["health"]);

        settings.reset_to_defaults();
        assert_eq!(coordinator.get::<Rates>(), DeductionRates::default());
    }

    // =========================================================================
    // Employee removal
    // =========================================================================

    fn seeded() -> (Coordinator, Employee) {
        let (coordinator, _) = coordinator();
        let ana = employee("Ana", 40);
        coordinator.set::<Employees>(vec![ana.clone(), employee("Luis", 10)]);
        coordinator.set::<Novelties>(vec![Novelty::absence(ana.id, 1, date(2026, 10, 2))]);
        coordinator.set::<Advances>(vec![AdvancePayment::new(
            ana.id,
            Money::new(dec!(5000)).unwrap(),
            date(2026, 10, 3),
        )]);
        (coordinator, ana)
    }

    #[test]
    fn test_remove_employee_without_cascade_keeps_references() {
        let (coordinator, ana) = seeded();

        let removed = coordinator.remove_employee(ana.id, false).unwrap();
        assert_eq!(removed.employee.id, ana.id);
        assert!(removed.novelties.is_empty());
        assert_eq!(coordinator.get::<Employees>().len(), 1);
        assert_eq!(coordinator.get::<Novelties>().len(), 1);
        assert_eq!(coordinator.get::<Advances>().len(), 1);
    }

    #[test]
    fn test_remove_employee_with_cascade() {
        let (coordinator, ana) = seeded();

        let removed = coordinator.remove_employee(ana.id, true).unwrap();
        assert_eq!(removed.novelties.len(), 1);
        assert_eq!(removed.advances.len(), 1);
        assert!(coordinator.get::<Novelties>().is_empty());
        assert!(coordinator.get::<Advances>().is_empty());

        assert!(matches!(
            coordinator.remove_employee(ana.id, true),
            Err(AppError::EmployeeNotFound(_))
        ));
    }

    // =========================================================================
    // Worked days
    // =========================================================================

    #[test]
    fn test_refresh_worked_days_at() {
        let (coordinator, store) = coordinator();
        let created = Utc.with_ymd_and_hms(2026, 10, 6, 12, 0, 0).unwrap();
        let ana = Employee::new("Ana", Money::ZERO, created).unwrap();
        coordinator.set::<Employees>(vec![ana]);

        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        assert_eq!(coordinator.refresh_worked_days_at(now), 1);

        assert_eq!(coordinator.get::<Employees>()[0].worked_days, 10);
        let stored: Vec<Employee> = serde_json::from_str(&store.raw("employees").unwrap()).unwrap();
        assert_eq!(stored[0].worked_days, 10);
    }

    #[test]
    fn test_start_without_runtime_fails() {
        let (coordinator, _) = coordinator();
        assert!(matches!(
            coordinator.start_worked_days(WorkedDaysJobConfig::default()),
            Err(AppError::NoRuntime)
        ));
        assert!(!coordinator.is_worked_days_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_recomputes_on_start() {
        let (coordinator, _) = coordinator();
        coordinator.set::<Employees>(vec![employee("Ana", 10)]);

        coordinator
            .start_worked_days(WorkedDaysJobConfig::default())
            .unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(coordinator.is_worked_days_running());
        assert_eq!(coordinator.get::<Employees>()[0].worked_days, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_roster_change_rearms_but_edits_wait_for_tick() {
        let (coordinator, _) = coordinator();
        coordinator.set::<Employees>(vec![employee("Ana", 10)]);
        coordinator
            .start_worked_days(WorkedDaysJobConfig::default())
            .unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        // Same roster size: no immediate recompute
        coordinator.update::<Employees, _>(|list| list[0].worked_days = 999);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(coordinator.get::<Employees>()[0].worked_days, 999);

        // New employee: re-armed, recomputed right away
        coordinator.update::<Employees, _>(|list| list.push(employee("Luis", 3)));
        tokio::time::sleep(Duration::from_secs(1)).await;
        let employees = coordinator.get::<Employees>();
        assert_eq!(employees[0].worked_days, 10);
        assert_eq!(employees[1].worked_days, 3);

        // Same-size edit again, picked up by the hourly tick
        coordinator.update::<Employees, _>(|list| list[1].worked_days = 999);
        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert_eq!(coordinator.get::<Employees>()[1].worked_days, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_job() {
        let (coordinator, _) = coordinator();
        coordinator
            .start_worked_days(WorkedDaysJobConfig::default())
            .unwrap();
        assert!(coordinator.is_worked_days_running());

        coordinator.shutdown();
        assert!(!coordinator.is_worked_days_running());
    }
}
