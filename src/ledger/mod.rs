//! Ledger records and the in-memory store that holds them.

pub mod account;
pub mod budget;
pub mod category;
pub mod date_range;
pub mod invoice;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod payment;
pub mod recurring;
pub mod time_interval;
pub mod transaction;
pub mod user;

pub use account::{Account, AccountKind, AccountStatus};
pub use budget::{Budget, BudgetPeriod};
pub use category::Category;
pub use date_range::{DateRange, MonthPeriod, QuarterPeriod};
pub use invoice::{
    Invoice, InvoiceItem, InvoicePayment, InvoiceStatus, DEFAULT_PAYMENT_METHOD, VAT_RATE,
};
pub use ledger::{InvoiceSequence, Ledger};
pub use payment::{Payment, PaymentStatus};
pub use recurring::{Frequency, RecurringPayment, RecurringStatus, MAX_PREVIEW_DATES};
pub use time_interval::{TimeInterval, TimeUnit};
pub use transaction::{Direction, Transaction, TransactionStatus};
pub use user::BusinessUser;
