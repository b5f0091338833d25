//! Filtered, read-only transaction listings handed to export formatters.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::Result;
use crate::ledger::{Category, DateRange, Direction, Ledger, Transaction};

/// Filters for [`TransactionService::query`]. Every field is optional; an empty query
/// returns all of the caller's transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionQuery {
    pub account_id: Option<Uuid>,
    pub range: DateRange,
    pub category: Option<Category>,
    pub direction: Option<Direction>,
    /// Case-insensitive substring over counterparty, description and reference.
    pub search: Option<String>,
    /// Bounds on the unsigned amount, both inclusive.
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
}

impl TransactionQuery {
    pub fn for_account(account_id: Uuid) -> Self {
        Self {
            account_id: Some(account_id),
            ..Self::default()
        }
    }

    pub fn range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn search(mut self, needle: impl Into<String>) -> Self {
        self.search = Some(needle.into());
        self
    }

    pub fn amount_between(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.min_amount = min;
        self.max_amount = max;
        self
    }

    fn matches(&self, txn: &Transaction, needle: Option<&str>) -> bool {
        if self.account_id.map_or(false, |id| txn.account_id != id) {
            return false;
        }
        if !self.range.contains(txn.created_at) {
            return false;
        }
        if self.category.is_some() && txn.category != self.category {
            return false;
        }
        if self.direction.map_or(false, |direction| txn.direction != direction) {
            return false;
        }
        let magnitude = txn.magnitude();
        if self.min_amount.map_or(false, |min| magnitude < min) {
            return false;
        }
        if self.max_amount.map_or(false, |max| magnitude > max) {
            return false;
        }
        match needle {
            Some(needle) => {
                txn.counterparty.to_lowercase().contains(needle)
                    || txn.description.to_lowercase().contains(needle)
                    || txn
                        .reference
                        .as_deref()
                        .map_or(false, |reference| reference.to_lowercase().contains(needle))
            }
            None => true,
        }
    }
}

pub struct TransactionService;

impl TransactionService {
    /// The caller's transactions matching `query`, newest first.
    ///
    /// Naming an account the caller does not own is `NotFound`.
    pub fn query(
        ledger: &Ledger,
        owner: Uuid,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>> {
        if let Some(account_id) = query.account_id {
            ledger.owned_account(owner, account_id)?;
        }
        let needle = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
            .map(str::to_lowercase);

        let mut matches: Vec<Transaction> = ledger
            .transactions_of(owner)
            .filter(|txn| query.matches(txn, needle.as_deref()))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }

    pub fn list_for_account(
        ledger: &Ledger,
        owner: Uuid,
        account_id: Uuid,
    ) -> Result<Vec<Transaction>> {
        Self::query(ledger, owner, &TransactionQuery::for_account(account_id))
    }
}
