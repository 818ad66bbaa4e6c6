//! Common test utilities

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use payroll_ledger::domain::{Employee, Money};
use payroll_ledger::{Coordinator, FileStore, Repository};
use rust_decimal::Decimal;
use tempfile::TempDir;

/// File-backed repository in a fresh temporary directory
pub fn file_repository() -> (Repository, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let repository = Repository::new(Arc::new(FileStore::new(temp_dir.path().join("data"))));
    (repository, temp_dir)
}

/// Coordinator over a repository rooted at `temp_dir`
pub fn open_coordinator(temp_dir: &TempDir) -> Coordinator {
    let store = FileStore::new(temp_dir.path().join("data"));
    Coordinator::open(Repository::new(Arc::new(store)))
}

pub fn money(value: Decimal) -> Money {
    Money::new(value).expect("Invalid test amount")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("Invalid test date")
}

pub fn instant(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0)
        .single()
        .expect("Invalid test instant")
}

/// Employee hired long before any test period
pub fn veteran(name: &str, salary: Decimal) -> Employee {
    Employee::new(name, money(salary), instant(2023, 2, 1, 15))
        .expect("Invalid test employee")
        .with_document_number("1020304050")
        .with_position("Operator")
}
