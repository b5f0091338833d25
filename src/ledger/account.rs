use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::Currency;

/// A bank account owned by a single business user.
///
/// `balance` is only ever changed by the payment processor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub account_number: String,
    pub balance: Decimal,
    pub currency: Currency,
    pub kind: AccountKind,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Creates an active account with a zero balance.
    pub fn new(
        owner_id: Uuid,
        account_number: impl Into<String>,
        currency: Currency,
        kind: AccountKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            account_number: account_number.into(),
            balance: Decimal::ZERO,
            currency,
            kind,
            status: AccountStatus::Active,
            created_at: Utc::now(),
        }
    }

    /// Seeds an imported account with an existing balance.
    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.balance = balance;
        self
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, AccountStatus::Active)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Business,
    Savings,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Frozen,
    Closed,
}
