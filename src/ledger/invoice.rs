use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{currency::Currency, errors::FinanceError};

/// Danish VAT (moms) rate applied to every invoice.
pub const VAT_RATE: Decimal = dec!(0.25);

/// Payment method recorded when the caller does not name one.
pub const DEFAULT_PAYMENT_METHOD: &str = "Bank Transfer";

/// A sales invoice with running payment reconciliation.
///
/// Holds `total == subtotal + tax`, `amount_paid == sum(payments)` and
/// `amount_paid <= total`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub invoice_number: String,
    pub customer_name: String,
    pub customer_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_cvr: Option<String>,
    pub items: Vec<InvoiceItem>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub currency: Currency,
    pub status: InvoiceStatus,
    pub due_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub amount_paid: Decimal,
    #[serde(default)]
    pub payments: Vec<InvoicePayment>,
}

impl Invoice {
    /// Outstanding amount; never negative while the invariants hold.
    pub fn remaining(&self) -> Decimal {
        self.total - self.amount_paid
    }

    pub fn is_fully_paid(&self) -> bool {
        self.amount_paid >= self.total
    }

    /// Whether the invoice counts as realised revenue for VAT purposes.
    pub fn counts_as_sale(&self) -> bool {
        matches!(
            self.status,
            InvoiceStatus::Paid | InvoiceStatus::PartiallyPaid
        )
    }

    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        !self.status.is_terminal() && self.due_date < today
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total: Decimal,
}

impl InvoiceItem {
    /// Creates a line whose total is derived from quantity and unit price.
    ///
    /// The total saturates at the decimal bounds; [`InvoiceItem::checked_total`] reports
    /// the overflow instead.
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            total: quantity.saturating_mul(unit_price),
        }
    }

    pub fn set_quantity(&mut self, quantity: Decimal) {
        self.quantity = quantity;
        self.recompute();
    }

    pub fn set_unit_price(&mut self, unit_price: Decimal) {
        self.unit_price = unit_price;
        self.recompute();
    }

    pub fn checked_total(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.unit_price)
    }

    fn recompute(&mut self) {
        self.total = self.quantity.saturating_mul(self.unit_price);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoicePayment {
    pub id: Uuid,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub method: String,
    #[serde(default)]
    pub reference: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    PartiallyPaid,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    /// Paid and cancelled invoices accept no further payments or overrides.
    pub fn is_terminal(&self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::PartiallyPaid => "partially_paid",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "draft" => Ok(InvoiceStatus::Draft),
            "sent" => Ok(InvoiceStatus::Sent),
            "partially_paid" => Ok(InvoiceStatus::PartiallyPaid),
            "paid" => Ok(InvoiceStatus::Paid),
            "overdue" => Ok(InvoiceStatus::Overdue),
            "cancelled" => Ok(InvoiceStatus::Cancelled),
            other => Err(FinanceError::validation(format!(
                "unknown invoice status `{}`",
                other
            ))),
        }
    }
}

/// Formats an invoice number as `{year}-{seq}` with at least three sequence digits.
pub fn format_invoice_number(year: i32, sequence: u32) -> String {
    format!("{}-{:03}", year, sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_totals_follow_quantity_and_price() {
        let mut item = InvoiceItem::new("Consulting", dec!(4), dec!(250));
        assert_eq!(item.total, dec!(1000));
        item.set_quantity(dec!(2));
        assert_eq!(item.total, dec!(500));
        item.set_unit_price(dec!(300));
        assert_eq!(item.total, dec!(600));
    }

    #[test]
    fn invoice_numbers_are_zero_padded() {
        assert_eq!(format_invoice_number(2025, 7), "2025-007");
        assert_eq!(format_invoice_number(2025, 1234), "2025-1234");
    }

    #[test]
    fn status_round_trips_through_snake_case() {
        let json = serde_json::to_string(&InvoiceStatus::PartiallyPaid).unwrap();
        assert_eq!(json, "\"partially_paid\"");
        assert_eq!(
            "partially_paid".parse::<InvoiceStatus>().unwrap(),
            InvoiceStatus::PartiallyPaid
        );
    }
}
