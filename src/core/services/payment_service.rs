//! Payment processor: outgoing payments and incoming receipts.
//!
//! Every balance change is paired with exactly one transaction. Neither operation takes
//! an idempotency key, so a caller retrying after a lost response applies it twice.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    currency::Currency,
    errors::{FinanceError, Result},
    ledger::{Category, Direction, Ledger, Payment, PaymentStatus, Transaction},
};

/// Instruction to pay a recipient from one of the caller's accounts.
#[derive(Debug, Clone)]
pub struct SendPayment {
    pub account_id: Uuid,
    pub recipient_name: String,
    pub recipient_account: String,
    pub amount: Decimal,
    pub currency: Option<Currency>,
    pub description: String,
    pub reference: String,
    pub category: Option<Category>,
    pub scheduled_for: Option<DateTime<Utc>>,
}

impl SendPayment {
    pub fn new(account_id: Uuid, recipient_name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account_id,
            recipient_name: recipient_name.into(),
            recipient_account: String::new(),
            amount,
            currency: None,
            description: String::new(),
            reference: String::new(),
            category: None,
            scheduled_for: None,
        }
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }
}

/// Money arriving on one of the caller's accounts.
#[derive(Debug, Clone)]
pub struct ReceivePayment {
    pub account_id: Uuid,
    pub amount: Decimal,
    pub description: String,
    pub counterparty: String,
    pub reference: Option<String>,
    pub category: Option<Category>,
}

impl ReceivePayment {
    pub fn new(account_id: Uuid, counterparty: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account_id,
            amount,
            description: String::new(),
            counterparty: counterparty.into(),
            reference: None,
            category: None,
        }
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

pub struct PaymentService;

impl PaymentService {
    /// Pays out from an owned account, settling synchronously.
    ///
    /// The outgoing transaction and payment are staged before the balance is decremented;
    /// nothing after validation can fail.
    pub fn send(
        ledger: &mut Ledger,
        owner: Uuid,
        request: SendPayment,
        now: DateTime<Utc>,
    ) -> Result<Payment> {
        let account = ledger.owned_account(owner, request.account_id)?;
        if request.amount <= Decimal::ZERO {
            warn!(account = %account.id, amount = %request.amount, "rejected non-positive payment");
            return Err(FinanceError::validation("payment amount must be positive"));
        }
        if request.recipient_name.trim().is_empty() {
            return Err(FinanceError::validation("recipient name is required"));
        }
        if !account.is_active() {
            return Err(FinanceError::validation(format!(
                "account {} is not active",
                account.account_number
            )));
        }
        if request.amount > account.balance {
            warn!(
                account = %account.id,
                balance = %account.balance,
                amount = %request.amount,
                "rejected payment exceeding balance"
            );
            return Err(FinanceError::InsufficientFunds {
                balance: account.balance,
                requested: request.amount,
            });
        }
        let account_id = account.id;
        let currency = request.currency.unwrap_or(account.currency);

        let mut txn =
            Transaction::completed(account_id, Direction::Outgoing, request.amount, currency, now);
        txn.description = request.description.clone();
        txn.counterparty = request.recipient_name.clone();
        txn.reference = non_empty(&request.reference);
        txn.category = request.category;

        let payment = Payment {
            id: Uuid::new_v4(),
            account_id,
            recipient_name: request.recipient_name,
            recipient_account: request.recipient_account,
            amount: request.amount,
            currency,
            description: request.description,
            reference: request.reference,
            category: request.category,
            status: PaymentStatus::Completed,
            created_at: now,
            scheduled_for: request.scheduled_for,
            transaction_id: Some(txn.id),
        };

        ledger.add_transaction(txn);
        ledger.add_payment(payment.clone());
        let account = ledger.owned_account_mut(owner, account_id)?;
        account.balance -= payment.amount;
        info!(
            account = %account_id,
            payment = %payment.id,
            amount = %payment.amount,
            balance = %account.balance,
            "payment sent"
        );
        Ok(payment)
    }

    /// Credits an owned account and records the incoming transaction.
    pub fn receive(
        ledger: &mut Ledger,
        owner: Uuid,
        request: ReceivePayment,
        now: DateTime<Utc>,
    ) -> Result<Transaction> {
        let account = ledger.owned_account(owner, request.account_id)?;
        if request.amount <= Decimal::ZERO {
            warn!(account = %account.id, amount = %request.amount, "rejected non-positive receipt");
            return Err(FinanceError::validation("received amount must be positive"));
        }
        if !account.is_active() {
            return Err(FinanceError::validation(format!(
                "account {} is not active",
                account.account_number
            )));
        }
        let account_id = account.id;
        let balance = account.balance.checked_add(request.amount).ok_or_else(|| {
            warn!(account = %account_id, amount = %request.amount, "receipt overflows balance");
            FinanceError::out_of_range(format!("balance of account {}", account.account_number))
        })?;

        let mut txn = Transaction::completed(
            account_id,
            Direction::Incoming,
            request.amount,
            account.currency,
            now,
        );
        txn.description = request.description;
        txn.counterparty = request.counterparty;
        txn.reference = request.reference.as_deref().and_then(non_empty);
        txn.category = request.category;

        ledger.add_transaction(txn.clone());
        let account = ledger.owned_account_mut(owner, account_id)?;
        account.balance = balance;
        info!(
            account = %account_id,
            transaction = %txn.id,
            amount = %txn.amount,
            balance = %account.balance,
            "payment received"
        );
        Ok(txn)
    }

    /// Payments on the caller's accounts, newest first.
    pub fn list(ledger: &Ledger, owner: Uuid) -> Vec<Payment> {
        let mut payments: Vec<Payment> = ledger.payments_of(owner).cloned().collect();
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        payments
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
