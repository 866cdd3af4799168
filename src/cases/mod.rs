//! Debt cases and payment records

mod data;
pub mod loader;

pub use data::{DebtCase, Payment};
pub use loader::{load_cases, load_cases_from_reader, load_cases_with_payments, load_payments, attach_payments};
