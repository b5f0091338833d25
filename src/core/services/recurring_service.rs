//! Standing orders: creation and pause/resume/cancel transitions.
//!
//! Materialising payments is left to an external scheduler, which can poll
//! [`RecurringService::due`].

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::currency::Currency;
use crate::errors::{FinanceError, Result};
use crate::ledger::{
    Category, Frequency, Ledger, RecurringPayment, RecurringStatus, MAX_PREVIEW_DATES,
};

#[derive(Debug, Clone)]
pub struct CreateRecurring {
    pub account_id: Uuid,
    pub recipient_name: String,
    pub recipient_account: String,
    pub amount: Decimal,
    pub currency: Option<Currency>,
    pub description: String,
    pub reference: String,
    pub category: Option<Category>,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl CreateRecurring {
    pub fn new(
        account_id: Uuid,
        recipient_name: impl Into<String>,
        amount: Decimal,
        frequency: Frequency,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            account_id,
            recipient_name: recipient_name.into(),
            recipient_account: String::new(),
            amount,
            currency: None,
            description: String::new(),
            reference: String::new(),
            category: None,
            frequency,
            start_date,
            end_date: None,
        }
    }

    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }
}

pub struct RecurringService;

impl RecurringService {
    pub fn create(
        ledger: &mut Ledger,
        owner: Uuid,
        request: CreateRecurring,
        now: DateTime<Utc>,
    ) -> Result<RecurringPayment> {
        let account = ledger.owned_account(owner, request.account_id)?;
        if request.amount <= Decimal::ZERO {
            return Err(FinanceError::validation(
                "recurring amount must be positive",
            ));
        }
        if request.recipient_name.trim().is_empty() {
            return Err(FinanceError::validation("recipient name is required"));
        }
        if let Some(end) = request.end_date {
            if end < request.start_date {
                return Err(FinanceError::validation(format!(
                    "end date {} is before start date {}",
                    end, request.start_date
                )));
            }
        }
        let recurring = RecurringPayment {
            id: Uuid::new_v4(),
            account_id: account.id,
            recipient_name: request.recipient_name,
            recipient_account: request.recipient_account,
            amount: request.amount,
            currency: request.currency.unwrap_or(account.currency),
            description: request.description,
            reference: request.reference,
            category: request.category,
            frequency: request.frequency,
            start_date: request.start_date,
            next_payment_date: request.start_date,
            end_date: request.end_date,
            status: RecurringStatus::Active,
            created_at: now,
            last_payment_id: None,
        };
        ledger.add_recurring_payment(recurring.clone());
        info!(
            recurring = %recurring.id,
            account = %recurring.account_id,
            amount = %recurring.amount,
            frequency = ?recurring.frequency,
            "recurring payment created"
        );
        Ok(recurring)
    }

    pub fn list(ledger: &Ledger, owner: Uuid) -> Vec<RecurringPayment> {
        let mut items: Vec<RecurringPayment> = ledger.recurring_of(owner).cloned().collect();
        items.sort_by(|a, b| a.next_payment_date.cmp(&b.next_payment_date));
        items
    }

    pub fn get(ledger: &Ledger, owner: Uuid, id: Uuid) -> Result<RecurringPayment> {
        ledger.owned_recurring(owner, id).cloned()
    }

    /// Moves between active, paused and cancelled. Cancelled is terminal.
    pub fn set_status(
        ledger: &mut Ledger,
        owner: Uuid,
        id: Uuid,
        status: RecurringStatus,
    ) -> Result<RecurringPayment> {
        let recurring = ledger.owned_recurring_mut(owner, id)?;
        if recurring.status == RecurringStatus::Cancelled && status != RecurringStatus::Cancelled {
            warn!(recurring = %id, "attempt to revive cancelled recurring payment");
            return Err(FinanceError::validation(
                "a cancelled recurring payment cannot be reactivated",
            ));
        }
        let previous = recurring.status;
        recurring.status = status;
        let updated = recurring.clone();
        ledger.touch();
        info!(recurring = %id, from = ?previous, to = ?status, "recurring status changed");
        Ok(updated)
    }

    pub fn pause(ledger: &mut Ledger, owner: Uuid, id: Uuid) -> Result<RecurringPayment> {
        Self::set_status(ledger, owner, id, RecurringStatus::Paused)
    }

    pub fn resume(ledger: &mut Ledger, owner: Uuid, id: Uuid) -> Result<RecurringPayment> {
        Self::set_status(ledger, owner, id, RecurringStatus::Active)
    }

    pub fn cancel(ledger: &mut Ledger, owner: Uuid, id: Uuid) -> Result<RecurringPayment> {
        Self::set_status(ledger, owner, id, RecurringStatus::Cancelled)
    }

    pub fn delete(ledger: &mut Ledger, owner: Uuid, id: Uuid) -> Result<RecurringPayment> {
        ledger.owned_recurring(owner, id)?;
        let position = ledger
            .recurring_payments
            .iter()
            .position(|rp| rp.id == id)
            .ok_or_else(|| FinanceError::not_found("Recurring payment"))?;
        let removed = ledger.recurring_payments.remove(position);
        ledger.touch();
        info!(recurring = %id, "recurring payment deleted");
        Ok(removed)
    }

    /// Active schedules whose next payment falls on or before `as_of` and within their end date.
    pub fn due(ledger: &Ledger, owner: Uuid, as_of: NaiveDate) -> Vec<RecurringPayment> {
        ledger
            .recurring_of(owner)
            .filter(|rp| rp.is_active())
            .filter(|rp| rp.next_payment_date <= as_of && rp.allows(rp.next_payment_date))
            .cloned()
            .collect()
    }

    /// Next `count` payment dates; at most [`MAX_PREVIEW_DATES`] can be requested.
    pub fn preview(
        ledger: &Ledger,
        owner: Uuid,
        id: Uuid,
        count: usize,
    ) -> Result<Vec<NaiveDate>> {
        let recurring = ledger.owned_recurring(owner, id)?;
        if count > MAX_PREVIEW_DATES {
            return Err(FinanceError::validation(format!(
                "at most {} dates can be previewed, got {}",
                MAX_PREVIEW_DATES, count
            )));
        }
        Ok(recurring.upcoming(count))
    }
}
