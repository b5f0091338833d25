//! Request-scoped capability handle.
//!
//! A [`UserScope`] is built once per authenticated request and binds every operation to
//! that user. Anything the user does not own is reported as `NotFound`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    currency::Currency,
    errors::{FinanceError, Result},
    ledger::{
        Account, AccountKind, Budget, BusinessUser, Category, DateRange, Invoice, InvoiceStatus,
        Payment, RecurringPayment, RecurringStatus, Transaction,
    },
};

use super::{
    services::{
        AccountService, AnalyticsOverview, AnalyticsService, AnnualSummary,
        BudgetPerformanceReport, BudgetService, CreateInvoice, CreateRecurring, InvoiceDocument,
        InvoiceService, MomsReport, PaymentService, ReceivePayment, RecordInvoicePayment,
        RecurringService, SendPayment, TaxService, TransactionQuery, TransactionService,
    },
    LedgerManager,
};

pub struct UserScope<'a> {
    manager: &'a LedgerManager,
    user_id: Uuid,
}

impl<'a> UserScope<'a> {
    pub(crate) fn new(manager: &'a LedgerManager, user_id: Uuid) -> Self {
        Self { manager, user_id }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn profile(&self) -> Result<BusinessUser> {
        self.manager
            .read(|ledger| ledger.user(self.user_id).cloned())?
            .ok_or_else(|| FinanceError::not_found("User"))
    }

    // Accounts

    pub fn open_account(
        &self,
        account_number: &str,
        currency: Currency,
        kind: AccountKind,
    ) -> Result<Account> {
        let now = self.manager.now();
        self.manager.write(|ledger| {
            AccountService::open(ledger, self.user_id, account_number, currency, kind, now)
        })
    }

    pub fn accounts(&self) -> Result<Vec<Account>> {
        self.manager
            .read(|ledger| AccountService::list(ledger, self.user_id))
    }

    pub fn account(&self, id: Uuid) -> Result<Account> {
        self.manager
            .read(|ledger| AccountService::get(ledger, self.user_id, id))?
    }

    // Payments

    pub fn send_payment(&self, request: SendPayment) -> Result<Payment> {
        let now = self.manager.now();
        self.manager
            .write(|ledger| PaymentService::send(ledger, self.user_id, request, now))
    }

    pub fn receive_payment(&self, request: ReceivePayment) -> Result<Transaction> {
        let now = self.manager.now();
        self.manager
            .write(|ledger| PaymentService::receive(ledger, self.user_id, request, now))
    }

    pub fn payments(&self) -> Result<Vec<Payment>> {
        self.manager
            .read(|ledger| PaymentService::list(ledger, self.user_id))
    }

    // Transactions

    pub fn transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>> {
        self.manager
            .read(|ledger| TransactionService::query(ledger, self.user_id, query))?
    }

    pub fn account_transactions(&self, account_id: Uuid) -> Result<Vec<Transaction>> {
        self.manager.read(|ledger| {
            TransactionService::list_for_account(ledger, self.user_id, account_id)
        })?
    }

    // Invoices

    pub fn create_invoice(&self, request: CreateInvoice) -> Result<Invoice> {
        let now = self.manager.now();
        self.manager
            .write(|ledger| InvoiceService::create(ledger, self.user_id, request, now))
    }

    pub fn record_invoice_payment(
        &self,
        invoice_id: Uuid,
        request: RecordInvoicePayment,
    ) -> Result<Invoice> {
        let now = self.manager.now();
        self.manager.write(|ledger| {
            InvoiceService::record_payment(ledger, self.user_id, invoice_id, request, now)
        })
    }

    pub fn set_invoice_status(&self, invoice_id: Uuid, status: InvoiceStatus) -> Result<Invoice> {
        let now = self.manager.now();
        self.manager.write(|ledger| {
            InvoiceService::set_status(ledger, self.user_id, invoice_id, status, now)
        })
    }

    pub fn invoices(&self) -> Result<Vec<Invoice>> {
        self.manager
            .read(|ledger| InvoiceService::list(ledger, self.user_id))
    }

    pub fn invoice(&self, invoice_id: Uuid) -> Result<Invoice> {
        self.manager
            .read(|ledger| InvoiceService::get(ledger, self.user_id, invoice_id))?
    }

    pub fn invoice_document(&self, invoice_id: Uuid) -> Result<InvoiceDocument> {
        self.manager
            .read(|ledger| InvoiceService::document(ledger, self.user_id, invoice_id))?
    }

    pub fn overdue_candidates(&self) -> Result<Vec<Invoice>> {
        let today = self.manager.now().date_naive();
        self.manager
            .read(|ledger| InvoiceService::overdue_candidates(ledger, self.user_id, today))
    }

    // Recurring payments

    pub fn create_recurring(&self, request: CreateRecurring) -> Result<RecurringPayment> {
        let now = self.manager.now();
        self.manager
            .write(|ledger| RecurringService::create(ledger, self.user_id, request, now))
    }

    pub fn recurring_payments(&self) -> Result<Vec<RecurringPayment>> {
        self.manager
            .read(|ledger| RecurringService::list(ledger, self.user_id))
    }

    pub fn recurring_payment(&self, id: Uuid) -> Result<RecurringPayment> {
        self.manager
            .read(|ledger| RecurringService::get(ledger, self.user_id, id))?
    }

    pub fn set_recurring_status(
        &self,
        id: Uuid,
        status: RecurringStatus,
    ) -> Result<RecurringPayment> {
        self.manager
            .write(|ledger| RecurringService::set_status(ledger, self.user_id, id, status))
    }

    pub fn pause_recurring(&self, id: Uuid) -> Result<RecurringPayment> {
        self.manager
            .write(|ledger| RecurringService::pause(ledger, self.user_id, id))
    }

    pub fn resume_recurring(&self, id: Uuid) -> Result<RecurringPayment> {
        self.manager
            .write(|ledger| RecurringService::resume(ledger, self.user_id, id))
    }

    pub fn cancel_recurring(&self, id: Uuid) -> Result<RecurringPayment> {
        self.manager
            .write(|ledger| RecurringService::cancel(ledger, self.user_id, id))
    }

    pub fn delete_recurring(&self, id: Uuid) -> Result<RecurringPayment> {
        self.manager
            .write(|ledger| RecurringService::delete(ledger, self.user_id, id))
    }

    pub fn due_recurring(&self, as_of: NaiveDate) -> Result<Vec<RecurringPayment>> {
        self.manager
            .read(|ledger| RecurringService::due(ledger, self.user_id, as_of))
    }

    pub fn preview_recurring(&self, id: Uuid, count: usize) -> Result<Vec<NaiveDate>> {
        self.manager
            .read(|ledger| RecurringService::preview(ledger, self.user_id, id, count))?
    }

    // Budgets

    pub fn create_budget(&self, category: Category, amount: Decimal) -> Result<Budget> {
        let now = self.manager.now();
        self.manager
            .write(|ledger| BudgetService::create(ledger, self.user_id, category, amount, now))
    }

    pub fn update_budget(&self, id: Uuid, amount: Decimal) -> Result<Budget> {
        let now = self.manager.now();
        self.manager.write(|ledger| {
            BudgetService::update_amount(ledger, self.user_id, id, amount, now)
        })
    }

    pub fn delete_budget(&self, id: Uuid) -> Result<Budget> {
        self.manager
            .write(|ledger| BudgetService::delete(ledger, self.user_id, id))
    }

    pub fn budgets(&self) -> Result<Vec<Budget>> {
        self.manager
            .read(|ledger| BudgetService::list(ledger, self.user_id))
    }

    pub fn budget_performance(
        &self,
        month: Option<u32>,
        year: Option<i32>,
    ) -> Result<BudgetPerformanceReport> {
        let today = self.manager.now().date_naive();
        self.manager.read(|ledger| {
            BudgetService::performance(ledger, self.user_id, month, year, today)
        })?
    }

    // Reports

    pub fn analytics(&self, range: &DateRange) -> Result<AnalyticsOverview> {
        let today = self.manager.now().date_naive();
        let rates = self.manager.rates();
        self.manager.read(|ledger| {
            AnalyticsService::overview(ledger, self.user_id, range, rates, today)
        })
    }

    pub fn moms_report(&self, quarter: u32, year: i32) -> Result<MomsReport> {
        self.manager
            .read(|ledger| TaxService::moms_report(ledger, self.user_id, quarter, year))?
    }

    pub fn annual_summary(&self, year: i32) -> Result<AnnualSummary> {
        self.manager
            .read(|ledger| TaxService::annual_summary(ledger, self.user_id, year))
    }
}
