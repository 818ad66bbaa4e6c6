//! Store module
//!
//! Persistence for the five payroll collections over a string-keyed,
//! string-valued storage medium.

mod backend;
mod error;
mod repository;

pub use backend::{FileStore, KeyValueStore, MemoryStore};
pub use error::StoreError;
pub use repository::{Repository, StorageKey};
