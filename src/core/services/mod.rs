pub mod account_service;
pub mod analytics_service;
pub mod budget_service;
pub mod invoice_service;
pub mod payment_service;
pub mod recurring_service;
pub mod tax_service;
pub mod transaction_service;

pub use account_service::AccountService;
pub use analytics_service::{AnalyticsOverview, AnalyticsService, CategoryTotal, MonthlyFigures};
pub use budget_service::{BudgetHealth, BudgetPerformance, BudgetPerformanceReport, BudgetService};
pub use invoice_service::{CreateInvoice, InvoiceDocument, InvoiceService, RecordInvoicePayment};
pub use payment_service::{PaymentService, ReceivePayment, SendPayment};
pub use recurring_service::{CreateRecurring, RecurringService};
pub use tax_service::{
    AnnualSummary, InvoiceStats, MomsReport, PurchaseCategory, QuarterFigures, TaxService,
};
pub use transaction_service::{TransactionQuery, TransactionService};
