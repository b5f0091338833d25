use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::Currency;

use super::category::Category;

/// An immutable, balance-affecting movement on an account.
///
/// `amount` is signed: positive for incoming, negative for outgoing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub direction: Direction,
    pub amount: Decimal,
    pub currency: Currency,
    pub description: String,
    pub counterparty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Builds a completed transaction whose sign follows `direction`.
    pub fn completed(
        account_id: Uuid,
        direction: Direction,
        magnitude: Decimal,
        currency: Currency,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            direction,
            amount: direction.signed(magnitude.abs()),
            currency,
            description: String::new(),
            counterparty: String::new(),
            reference: None,
            category: None,
            tags: Vec::new(),
            status: TransactionStatus::Completed,
            created_at: at,
            completed_at: Some(at),
        }
    }

    pub fn is_incoming(&self) -> bool {
        matches!(self.direction, Direction::Incoming)
    }

    pub fn is_outgoing(&self) -> bool {
        matches!(self.direction, Direction::Outgoing)
    }

    /// Unsigned size of the movement.
    pub fn magnitude(&self) -> Decimal {
        self.amount.abs()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl Direction {
    pub fn signed(&self, magnitude: Decimal) -> Decimal {
        match self {
            Direction::Incoming => magnitude,
            Direction::Outgoing => -magnitude,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Completed,
    Pending,
    Failed,
}
