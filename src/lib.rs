#![doc(test(attr(deny(warnings))))]

//! Finans Core is the bookkeeping engine behind a small-business banking app: accounts
//! and payments, invoices with partial-payment reconciliation, budgets, and the Danish
//! moms (VAT) reports derived from them.

pub mod config;
pub mod core;
pub mod currency;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

pub use crate::core::{LedgerManager, UserScope};
pub use crate::errors::{FinanceError, Result};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(None);
        tracing::info!("Finans Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
