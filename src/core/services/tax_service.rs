//! Quarterly moms (VAT) settlement and the annual tax summary.

use std::collections::BTreeMap;

use chrono::Datelike;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::currency::saturating_sum;
use crate::errors::Result;
use crate::ledger::{Category, Invoice, InvoiceStatus, Ledger, QuarterPeriod, Transaction};

/// VAT share of a VAT-inclusive purchase amount at 25% moms: 0.25 / 1.25.
pub const PURCHASE_VAT_SHARE: Decimal = dec!(0.20);

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PurchaseCategory {
    pub category: Category,
    pub total_amount: Decimal,
    pub estimated_moms: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MomsReport {
    pub quarter: u32,
    pub year: i32,
    /// First and last month covered, 1-based.
    pub start_month: u32,
    pub end_month: u32,
    pub total_sales: Decimal,
    /// Udgående moms: VAT collected on realised sales.
    pub moms_on_sales: Decimal,
    pub invoice_count: usize,
    pub total_purchases: Decimal,
    /// Indgående moms: estimated VAT embedded in purchases.
    pub moms_on_purchases: Decimal,
    pub transaction_count: usize,
    pub purchases_by_category: Vec<PurchaseCategory>,
    /// Amount owed to the tax authority; negative means a refund.
    pub net_moms: Decimal,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuarterFigures {
    pub quarter: u32,
    pub revenue: Decimal,
    pub expenses: Decimal,
    pub income: Decimal,
    pub profit: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct InvoiceStats {
    pub total: usize,
    pub paid: usize,
    /// Invoices sent and awaiting payment.
    pub pending: usize,
    pub overdue: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnnualSummary {
    pub year: i32,
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub total_income: Decimal,
    pub total_vat_collected: Decimal,
    pub profit: Decimal,
    pub expenses_by_category: BTreeMap<Category, Decimal>,
    pub quarters: Vec<QuarterFigures>,
    pub invoice_stats: InvoiceStats,
}

pub struct TaxService;

impl TaxService {
    /// Moms settlement for one quarter. Sales come from paid or partially paid invoices
    /// created in the quarter; purchases from outgoing transactions in the quarter.
    pub fn moms_report(
        ledger: &Ledger,
        owner: Uuid,
        quarter: u32,
        year: i32,
    ) -> Result<MomsReport> {
        let period = QuarterPeriod::new(year, quarter)?;

        let sales: Vec<&Invoice> = ledger
            .invoices_of(owner)
            .filter(|invoice| period.contains(invoice.created_at) && invoice.counts_as_sale())
            .collect();
        let total_sales = saturating_sum(sales.iter().map(|invoice| invoice.subtotal));
        let moms_on_sales = saturating_sum(sales.iter().map(|invoice| invoice.tax));

        let purchases: Vec<&Transaction> = ledger
            .transactions_of(owner)
            .filter(|txn| txn.is_outgoing() && period.contains(txn.created_at))
            .collect();
        let total_purchases = saturating_sum(purchases.iter().map(|txn| txn.magnitude()));
        let moms_on_purchases = total_purchases.saturating_mul(PURCHASE_VAT_SHARE);

        let mut by_category: BTreeMap<Category, PurchaseCategory> = BTreeMap::new();
        for txn in &purchases {
            let Some(category) = txn.category else {
                continue;
            };
            let entry = by_category.entry(category).or_insert(PurchaseCategory {
                category,
                total_amount: Decimal::ZERO,
                estimated_moms: Decimal::ZERO,
                count: 0,
            });
            entry.total_amount = entry.total_amount.saturating_add(txn.magnitude());
            let moms = txn.magnitude().saturating_mul(PURCHASE_VAT_SHARE);
            entry.estimated_moms = entry.estimated_moms.saturating_add(moms);
            entry.count += 1;
        }

        let report = MomsReport {
            quarter,
            year,
            start_month: period.start_month(),
            end_month: period.end_month(),
            total_sales,
            moms_on_sales,
            invoice_count: sales.len(),
            total_purchases,
            moms_on_purchases,
            transaction_count: purchases.len(),
            purchases_by_category: by_category.into_values().collect(),
            net_moms: moms_on_sales.saturating_sub(moms_on_purchases),
        };
        debug!(owner = %owner, quarter, year, net = %report.net_moms, "moms report computed");
        Ok(report)
    }

    pub fn annual_summary(ledger: &Ledger, owner: Uuid, year: i32) -> AnnualSummary {
        let invoices: Vec<&Invoice> = ledger
            .invoices_of(owner)
            .filter(|invoice| invoice.created_at.year() == year)
            .collect();
        let transactions: Vec<&Transaction> = ledger
            .transactions_of(owner)
            .filter(|txn| txn.created_at.year() == year)
            .collect();

        let quarters: Vec<QuarterFigures> = QuarterPeriod::all_in(year)
            .iter()
            .map(|period| {
                let revenue = revenue_of(
                    invoices
                        .iter()
                        .copied()
                        .filter(|i| period.contains(i.created_at)),
                );
                let (income, expenses) = flows_of(
                    transactions
                        .iter()
                        .copied()
                        .filter(|t| period.contains(t.created_at)),
                );
                QuarterFigures {
                    quarter: period.quarter(),
                    revenue,
                    expenses,
                    income,
                    profit: revenue.saturating_sub(expenses),
                }
            })
            .collect();

        let mut expenses_by_category = BTreeMap::new();
        for txn in transactions.iter().filter(|txn| txn.is_outgoing()) {
            if let Some(category) = txn.category {
                let spent = expenses_by_category.entry(category).or_insert(Decimal::ZERO);
                *spent = spent.saturating_add(txn.magnitude());
            }
        }

        let mut invoice_stats = InvoiceStats {
            total: invoices.len(),
            ..InvoiceStats::default()
        };
        for invoice in &invoices {
            match invoice.status {
                InvoiceStatus::Paid => invoice_stats.paid += 1,
                InvoiceStatus::Sent => invoice_stats.pending += 1,
                InvoiceStatus::Overdue => invoice_stats.overdue += 1,
                _ => {}
            }
        }

        let total_revenue = revenue_of(invoices.iter().copied());
        let (total_income, total_expenses) = flows_of(transactions.iter().copied());
        let summary = AnnualSummary {
            year,
            total_revenue,
            total_expenses,
            total_income,
            total_vat_collected: saturating_sum(
                invoices
                    .iter()
                    .filter(|invoice| invoice.counts_as_sale())
                    .map(|invoice| invoice.tax),
            ),
            profit: total_revenue.saturating_sub(total_expenses),
            expenses_by_category,
            quarters,
            invoice_stats,
        };
        debug!(owner = %owner, year, profit = %summary.profit, "annual summary computed");
        summary
    }
}

fn revenue_of<'a>(invoices: impl Iterator<Item = &'a Invoice>) -> Decimal {
    saturating_sum(
        invoices
            .filter(|invoice| invoice.counts_as_sale())
            .map(|invoice| invoice.subtotal),
    )
}

/// Incoming and outgoing totals, both unsigned.
fn flows_of<'a>(transactions: impl Iterator<Item = &'a Transaction>) -> (Decimal, Decimal) {
    transactions.fold((Decimal::ZERO, Decimal::ZERO), |(income, expenses), txn| {
        if txn.is_incoming() {
            (income.saturating_add(txn.magnitude()), expenses)
        } else {
            (income, expenses.saturating_add(txn.magnitude()))
        }
    })
}
