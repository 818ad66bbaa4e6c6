//! Application module
//!
//! The state coordinator, the collections it owns and the per-section views.

mod coordinator;
mod section;
pub mod state;
pub mod views;

pub use coordinator::{Coordinator, RemovedEmployee};
pub use section::Section;
pub use state::{Advances, AppState, Employees, Novelties, PayrollCalculations, Rates, Slice};
pub use views::{Reader, View, Writer};

#[cfg(test)]
mod tests;
