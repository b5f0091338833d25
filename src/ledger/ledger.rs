use std::collections::HashSet;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{FinanceError, Result};

use super::{
    account::Account,
    budget::Budget,
    invoice::{format_invoice_number, Invoice},
    payment::Payment,
    recurring::RecurringPayment,
    transaction::Transaction,
    user::BusinessUser,
};

pub(crate) const CURRENT_SCHEMA_VERSION: u8 = 1;

/// The ledger store: every record kind, keyed by id, with owner-scoped lookups.
///
/// Holds no behaviour beyond storage and lookup; business rules live in the services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub id: Uuid,
    #[serde(default)]
    pub users: Vec<BusinessUser>,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub recurring_payments: Vec<RecurringPayment>,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    #[serde(default)]
    pub budgets: Vec<Budget>,
    #[serde(default)]
    pub invoice_sequences: Vec<InvoiceSequence>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

/// Last invoice sequence number handed out for one user and year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvoiceSequence {
    pub owner_id: Uuid,
    pub year: i32,
    pub last: u32,
}

impl Ledger {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            users: Vec::new(),
            accounts: Vec::new(),
            transactions: Vec::new(),
            payments: Vec::new(),
            recurring_payments: Vec::new(),
            invoices: Vec::new(),
            budgets: Vec::new(),
            invoice_sequences: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn add_user(&mut self, user: BusinessUser) -> Uuid {
        let id = user.id;
        self.users.push(user);
        self.touch();
        id
    }

    pub fn add_account(&mut self, account: Account) -> Uuid {
        let id = account.id;
        self.accounts.push(account);
        self.touch();
        id
    }

    pub fn add_transaction(&mut self, transaction: Transaction) -> Uuid {
        let id = transaction.id;
        self.transactions.push(transaction);
        self.touch();
        id
    }

    pub fn add_payment(&mut self, payment: Payment) -> Uuid {
        let id = payment.id;
        self.payments.push(payment);
        self.touch();
        id
    }

    pub fn add_recurring_payment(&mut self, recurring: RecurringPayment) -> Uuid {
        let id = recurring.id;
        self.recurring_payments.push(recurring);
        self.touch();
        id
    }

    pub fn add_invoice(&mut self, invoice: Invoice) -> Uuid {
        let id = invoice.id;
        self.invoices.push(invoice);
        self.touch();
        id
    }

    pub fn add_budget(&mut self, budget: Budget) -> Uuid {
        let id = budget.id;
        self.budgets.push(budget);
        self.touch();
        id
    }

    pub fn user(&self, id: Uuid) -> Option<&BusinessUser> {
        self.users.iter().find(|user| user.id == id)
    }

    pub fn account(&self, id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn invoice(&self, id: Uuid) -> Option<&Invoice> {
        self.invoices.iter().find(|invoice| invoice.id == id)
    }

    /// Account owned by `owner`, or `NotFound` when missing or foreign.
    pub fn owned_account(&self, owner: Uuid, id: Uuid) -> Result<&Account> {
        self.accounts
            .iter()
            .find(|account| account.id == id && account.owner_id == owner)
            .ok_or_else(|| FinanceError::not_found("Account"))
    }

    pub fn owned_account_mut(&mut self, owner: Uuid, id: Uuid) -> Result<&mut Account> {
        self.accounts
            .iter_mut()
            .find(|account| account.id == id && account.owner_id == owner)
            .ok_or_else(|| FinanceError::not_found("Account"))
    }

    pub fn owned_invoice(&self, owner: Uuid, id: Uuid) -> Result<&Invoice> {
        self.invoices
            .iter()
            .find(|invoice| invoice.id == id && invoice.owner_id == owner)
            .ok_or_else(|| FinanceError::not_found("Invoice"))
    }

    pub fn owned_invoice_mut(&mut self, owner: Uuid, id: Uuid) -> Result<&mut Invoice> {
        self.invoices
            .iter_mut()
            .find(|invoice| invoice.id == id && invoice.owner_id == owner)
            .ok_or_else(|| FinanceError::not_found("Invoice"))
    }

    pub fn owned_budget_mut(&mut self, owner: Uuid, id: Uuid) -> Result<&mut Budget> {
        self.budgets
            .iter_mut()
            .find(|budget| budget.id == id && budget.owner_id == owner)
            .ok_or_else(|| FinanceError::not_found("Budget"))
    }

    /// Recurring payments are owned through their account.
    pub fn owned_recurring(&self, owner: Uuid, id: Uuid) -> Result<&RecurringPayment> {
        let accounts = self.account_ids_of(owner);
        self.recurring_payments
            .iter()
            .find(|rp| rp.id == id && accounts.contains(&rp.account_id))
            .ok_or_else(|| FinanceError::not_found("Recurring payment"))
    }

    pub fn owned_recurring_mut(&mut self, owner: Uuid, id: Uuid) -> Result<&mut RecurringPayment> {
        let accounts = self.account_ids_of(owner);
        self.recurring_payments
            .iter_mut()
            .find(|rp| rp.id == id && accounts.contains(&rp.account_id))
            .ok_or_else(|| FinanceError::not_found("Recurring payment"))
    }

    pub fn account_ids_of(&self, owner: Uuid) -> HashSet<Uuid> {
        self.accounts_of(owner).map(|account| account.id).collect()
    }

    pub fn accounts_of(&self, owner: Uuid) -> impl Iterator<Item = &Account> + '_ {
        self.accounts
            .iter()
            .filter(move |account| account.owner_id == owner)
    }

    pub fn transactions_of(&self, owner: Uuid) -> impl Iterator<Item = &Transaction> + '_ {
        let accounts = self.account_ids_of(owner);
        self.transactions
            .iter()
            .filter(move |txn| accounts.contains(&txn.account_id))
    }

    pub fn payments_of(&self, owner: Uuid) -> impl Iterator<Item = &Payment> + '_ {
        let accounts = self.account_ids_of(owner);
        self.payments
            .iter()
            .filter(move |payment| accounts.contains(&payment.account_id))
    }

    pub fn recurring_of(&self, owner: Uuid) -> impl Iterator<Item = &RecurringPayment> + '_ {
        let accounts = self.account_ids_of(owner);
        self.recurring_payments
            .iter()
            .filter(move |rp| accounts.contains(&rp.account_id))
    }

    pub fn invoices_of(&self, owner: Uuid) -> impl Iterator<Item = &Invoice> + '_ {
        self.invoices
            .iter()
            .filter(move |invoice| invoice.owner_id == owner)
    }

    pub fn budgets_of(&self, owner: Uuid) -> impl Iterator<Item = &Budget> + '_ {
        self.budgets
            .iter()
            .filter(move |budget| budget.owner_id == owner)
    }

    /// Hands out the next invoice number for `owner` in `year` and records it.
    ///
    /// A missing counter is seeded from the invoices already stored for that year, so
    /// ledgers imported without counters keep numbering where they left off.
    pub fn next_invoice_number(&mut self, owner: Uuid, year: i32) -> String {
        let position = self
            .invoice_sequences
            .iter()
            .position(|seq| seq.owner_id == owner && seq.year == year);
        let index = match position {
            Some(index) => index,
            None => {
                let existing = self
                    .invoices_of(owner)
                    .filter(|invoice| invoice.created_at.year() == year)
                    .count() as u32;
                self.invoice_sequences.push(InvoiceSequence {
                    owner_id: owner,
                    year,
                    last: existing,
                });
                self.invoice_sequences.len() - 1
            }
        };
        let sequence = &mut self.invoice_sequences[index];
        sequence.last += 1;
        format_invoice_number(year, sequence.last)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
