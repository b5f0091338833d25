pub mod ledger_manager;
pub mod scope;
pub mod services;
pub mod time;

pub use ledger_manager::LedgerManager;
pub use scope::UserScope;
pub use time::{Clock, FixedClock, SystemClock};
