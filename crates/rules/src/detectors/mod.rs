//! The nine built-in audit rules.
//!
//! Each rule lives in the module matching the accounting concern it checks:
//! - [`suspense`]: unbalanced 471 suspense account
//! - [`cash`]: cash register running below zero
//! - [`duplicates`]: repeated postings outside bank/opening journals
//! - [`calendar`]: Sunday postings and entries outside the fiscal year
//! - [`amounts`]: suspiciously round expense debits
//! - [`keywords`]: fines and penalties in entry labels
//! - [`balances`]: suppliers in debit, customers in credit

mod amounts;
mod balances;
mod calendar;
mod cash;
mod duplicates;
mod keywords;
mod suspense;

pub use amounts::RoundAmounts;
pub use balances::{CreditorCustomers, DebtorSuppliers};
pub use calendar::{OutOfPeriod, SundayPostings};
pub use cash::{NegativeCash, CASH_EPSILON};
pub use duplicates::Duplicates;
pub use keywords::{ForbiddenKeywords, FORBIDDEN_KEYWORDS};
pub use suspense::SuspenseAccount;

use crate::detector::Detector;

/// The full rule battery in execution order (rule 1 first).
pub fn standard() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(SuspenseAccount),
        Box::new(NegativeCash),
        Box::new(Duplicates),
        Box::new(SundayPostings),
        Box::new(RoundAmounts),
        Box::new(ForbiddenKeywords),
        Box::new(DebtorSuppliers),
        Box::new(CreditorCustomers),
        Box::new(OutOfPeriod),
    ]
}
