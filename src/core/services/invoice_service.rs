//! Invoice lifecycle: creation with VAT, payment reconciliation, and status overrides.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    currency::{checked_sum, Currency},
    errors::{FinanceError, Result},
    ledger::{
        BusinessUser, Invoice, InvoiceItem, InvoicePayment, InvoiceStatus, Ledger,
        DEFAULT_PAYMENT_METHOD, VAT_RATE,
    },
};

#[derive(Debug, Clone)]
pub struct CreateInvoice {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_cvr: Option<String>,
    pub items: Vec<InvoiceItem>,
    pub currency: Option<Currency>,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct RecordInvoicePayment {
    pub amount: Decimal,
    pub method: Option<String>,
    pub reference: Option<String>,
}

impl RecordInvoicePayment {
    pub fn amount(amount: Decimal) -> Self {
        Self {
            amount,
            method: None,
            reference: None,
        }
    }
}

/// Invoice together with the issuing business, as handed to document renderers.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDocument {
    pub invoice: Invoice,
    pub issuer: Option<BusinessUser>,
}

pub struct InvoiceService;

impl InvoiceService {
    /// Creates a draft invoice. Line totals are recomputed from quantity and unit price.
    pub fn create(
        ledger: &mut Ledger,
        owner: Uuid,
        request: CreateInvoice,
        now: DateTime<Utc>,
    ) -> Result<Invoice> {
        if request.customer_name.trim().is_empty() {
            return Err(FinanceError::validation("customer name is required"));
        }
        if request.customer_email.trim().is_empty() {
            return Err(FinanceError::validation("customer email is required"));
        }
        if request.items.is_empty() {
            return Err(FinanceError::validation(
                "an invoice needs at least one item",
            ));
        }
        let mut items = Vec::with_capacity(request.items.len());
        for mut item in request.items {
            item.total = item
                .checked_total()
                .ok_or_else(|| FinanceError::out_of_range(format!("item `{}`", item.description)))?;
            if item.total < Decimal::ZERO {
                return Err(FinanceError::validation(format!(
                    "item `{}` has a negative total",
                    item.description
                )));
            }
            items.push(item);
        }

        let subtotal = checked_sum(items.iter().map(|item| item.total))
            .ok_or_else(|| FinanceError::out_of_range("invoice subtotal"))?;
        let tax = subtotal
            .checked_mul(VAT_RATE)
            .ok_or_else(|| FinanceError::out_of_range("invoice VAT"))?;
        let total = subtotal
            .checked_add(tax)
            .ok_or_else(|| FinanceError::out_of_range("invoice total"))?;
        let invoice = Invoice {
            id: Uuid::new_v4(),
            owner_id: owner,
            invoice_number: ledger.next_invoice_number(owner, now.year()),
            customer_name: request.customer_name,
            customer_email: request.customer_email,
            customer_cvr: request.customer_cvr.filter(|cvr| !cvr.trim().is_empty()),
            items,
            subtotal,
            tax,
            total,
            currency: request.currency.unwrap_or_default(),
            status: InvoiceStatus::Draft,
            due_date: request.due_date,
            created_at: now,
            paid_at: None,
            amount_paid: Decimal::ZERO,
            payments: Vec::new(),
        };
        ledger.add_invoice(invoice.clone());
        info!(
            invoice = %invoice.id,
            number = %invoice.invoice_number,
            total = %invoice.total,
            "invoice created"
        );
        Ok(invoice)
    }

    /// Records a full or partial payment and re-derives the status.
    ///
    /// A partial payment on an overdue invoice leaves it overdue; full settlement always
    /// moves it to `paid`.
    pub fn record_payment(
        ledger: &mut Ledger,
        owner: Uuid,
        invoice_id: Uuid,
        request: RecordInvoicePayment,
        now: DateTime<Utc>,
    ) -> Result<Invoice> {
        let invoice = ledger.owned_invoice_mut(owner, invoice_id)?;
        if request.amount <= Decimal::ZERO {
            return Err(FinanceError::validation("payment amount must be positive"));
        }
        if invoice.status.is_terminal() {
            warn!(invoice = %invoice.id, status = %invoice.status, "payment on closed invoice");
            return Err(FinanceError::validation(format!(
                "invoice {} is {} and accepts no payments",
                invoice.invoice_number, invoice.status
            )));
        }
        let remaining = invoice.remaining();
        if request.amount > remaining {
            warn!(
                invoice = %invoice.id,
                amount = %request.amount,
                remaining = %remaining,
                "rejected overpayment"
            );
            return Err(FinanceError::Overpayment { remaining });
        }

        invoice.payments.push(InvoicePayment {
            id: Uuid::new_v4(),
            amount: request.amount,
            date: now,
            method: request
                .method
                .filter(|method| !method.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string()),
            reference: request.reference.unwrap_or_default(),
        });
        invoice.amount_paid += request.amount;

        if invoice.is_fully_paid() {
            invoice.status = InvoiceStatus::Paid;
            invoice.paid_at = Some(now);
        } else if invoice.status != InvoiceStatus::Overdue {
            invoice.status = InvoiceStatus::PartiallyPaid;
        }
        let updated = invoice.clone();
        ledger.touch();
        info!(
            invoice = %updated.id,
            amount = %request.amount,
            amount_paid = %updated.amount_paid,
            status = %updated.status,
            "invoice payment recorded"
        );
        Ok(updated)
    }

    /// Overrides the status to `sent`, `paid`, `overdue` or `cancelled`.
    ///
    /// Setting `paid` stamps `paid_at` but leaves `amount_paid` and the payment list alone.
    pub fn set_status(
        ledger: &mut Ledger,
        owner: Uuid,
        invoice_id: Uuid,
        status: InvoiceStatus,
        now: DateTime<Utc>,
    ) -> Result<Invoice> {
        let invoice = ledger.owned_invoice_mut(owner, invoice_id)?;
        if matches!(status, InvoiceStatus::Draft | InvoiceStatus::PartiallyPaid) {
            return Err(FinanceError::validation(format!(
                "status `{}` cannot be set directly",
                status
            )));
        }
        if invoice.status.is_terminal() {
            return Err(FinanceError::validation(format!(
                "invoice {} is already {}",
                invoice.invoice_number, invoice.status
            )));
        }
        let previous = invoice.status;
        invoice.status = status;
        if status == InvoiceStatus::Paid {
            invoice.paid_at = Some(now);
        }
        let updated = invoice.clone();
        ledger.touch();
        info!(invoice = %updated.id, from = %previous, to = %status, "invoice status changed");
        Ok(updated)
    }

    /// The caller's invoices, newest first.
    pub fn list(ledger: &Ledger, owner: Uuid) -> Vec<Invoice> {
        let mut invoices: Vec<Invoice> = ledger.invoices_of(owner).cloned().collect();
        invoices.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        invoices
    }

    pub fn get(ledger: &Ledger, owner: Uuid, invoice_id: Uuid) -> Result<Invoice> {
        ledger.owned_invoice(owner, invoice_id).cloned()
    }

    pub fn document(ledger: &Ledger, owner: Uuid, invoice_id: Uuid) -> Result<InvoiceDocument> {
        let invoice = ledger.owned_invoice(owner, invoice_id)?.clone();
        Ok(InvoiceDocument {
            invoice,
            issuer: ledger.user(owner).cloned(),
        })
    }

    /// Open invoices past their due date that an external sweep may mark overdue.
    pub fn overdue_candidates(ledger: &Ledger, owner: Uuid, today: NaiveDate) -> Vec<Invoice> {
        ledger
            .invoices_of(owner)
            .filter(|invoice| invoice.status != InvoiceStatus::Overdue)
            .filter(|invoice| invoice.status != InvoiceStatus::Draft)
            .filter(|invoice| invoice.is_overdue_on(today))
            .cloned()
            .collect()
    }
}
