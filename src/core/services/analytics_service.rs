//! Dashboard analytics recomputed from the ledger on every call.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::currency::{saturating_sum, Currency, RateProvider};
use crate::ledger::time_interval::{month_start, shift_month};
use crate::ledger::{Category, DateRange, InvoiceStatus, Ledger, MonthPeriod};

/// Number of calendar months in the trailing series, current month included.
pub const TRAILING_MONTHS: i32 = 6;

const DANISH_MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "maj", "jun", "jul", "aug", "sep", "okt", "nov", "dec",
];

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthlyFigures {
    pub label: String,
    pub year: i32,
    pub month: u32,
    pub income: Decimal,
    pub expenses: Decimal,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryTotal {
    pub category: Category,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalyticsOverview {
    pub base_currency: Currency,
    /// Current balances across all accounts in the base currency, ignoring the range.
    pub total_balance: Decimal,
    pub monthly_income: Decimal,
    pub monthly_expenses: Decimal,
    pub total_invoiced: Decimal,
    pub total_paid: Decimal,
    pub total_overdue: Decimal,
    pub monthly_data: Vec<MonthlyFigures>,
    pub category_data: Vec<CategoryTotal>,
    pub account_count: usize,
    pub overdue_invoice_count: usize,
}

pub struct AnalyticsService;

impl AnalyticsService {
    /// Builds the overview. `range` filters income, expenses and the category split only;
    /// balances, invoice totals and the trailing month series ignore it.
    pub fn overview(
        ledger: &Ledger,
        owner: Uuid,
        range: &DateRange,
        rates: &dyn RateProvider,
        today: NaiveDate,
    ) -> AnalyticsOverview {
        let mut monthly_income = Decimal::ZERO;
        let mut monthly_expenses = Decimal::ZERO;
        let mut by_category: BTreeMap<Category, Decimal> = BTreeMap::new();
        for txn in ledger
            .transactions_of(owner)
            .filter(|txn| range.contains(txn.created_at))
        {
            if txn.is_incoming() {
                monthly_income = monthly_income.saturating_add(txn.magnitude());
            } else {
                monthly_expenses = monthly_expenses.saturating_add(txn.magnitude());
                if let Some(category) = txn.category {
                    let spent = by_category.entry(category).or_insert(Decimal::ZERO);
                    *spent = spent.saturating_add(txn.magnitude());
                }
            }
        }
        let mut category_data: Vec<CategoryTotal> = by_category
            .into_iter()
            .map(|(category, amount)| CategoryTotal { category, amount })
            .collect();
        category_data.sort_by(|a, b| b.amount.cmp(&a.amount));

        let mut total_invoiced = Decimal::ZERO;
        let mut total_paid = Decimal::ZERO;
        let mut total_overdue = Decimal::ZERO;
        let mut overdue_invoice_count = 0;
        for invoice in ledger.invoices_of(owner) {
            total_invoiced = total_invoiced.saturating_add(invoice.total);
            match invoice.status {
                InvoiceStatus::Paid => total_paid = total_paid.saturating_add(invoice.total),
                InvoiceStatus::Overdue => {
                    total_overdue = total_overdue.saturating_add(invoice.total);
                    overdue_invoice_count += 1;
                }
                _ => {}
            }
        }

        let overview = AnalyticsOverview {
            base_currency: rates.base(),
            total_balance: Self::total_balance(ledger, owner, rates),
            monthly_income,
            monthly_expenses,
            total_invoiced,
            total_paid,
            total_overdue,
            monthly_data: Self::trailing_months(ledger, owner, today),
            category_data,
            account_count: ledger.accounts_of(owner).count(),
            overdue_invoice_count,
        };
        debug!(
            owner = %owner,
            income = %overview.monthly_income,
            expenses = %overview.monthly_expenses,
            "analytics computed"
        );
        overview
    }

    /// Sum of current balances in the base currency. Accounts whose currency has no rate
    /// are left out.
    pub fn total_balance(ledger: &Ledger, owner: Uuid, rates: &dyn RateProvider) -> Decimal {
        saturating_sum(ledger.accounts_of(owner).filter_map(|account| {
            match rates.convert(account.balance, account.currency) {
                Some(converted) => Some(converted.amount),
                None => {
                    warn!(
                        account = %account.id,
                        currency = %account.currency,
                        "no conversion rate or overflow; balance excluded from total"
                    );
                    None
                }
            }
        }))
    }

    fn trailing_months(ledger: &Ledger, owner: Uuid, today: NaiveDate) -> Vec<MonthlyFigures> {
        let current = month_start(today);
        (0..TRAILING_MONTHS)
            .rev()
            .map(|back| {
                let first = shift_month(current, -back);
                let period = MonthPeriod::containing(first);
                let (income, expenses) = ledger
                    .transactions_of(owner)
                    .filter(|txn| period.contains(txn.created_at))
                    .fold((Decimal::ZERO, Decimal::ZERO), |(income, expenses), txn| {
                        if txn.is_incoming() {
                            (income.saturating_add(txn.magnitude()), expenses)
                        } else {
                            (income, expenses.saturating_add(txn.magnitude()))
                        }
                    });
                MonthlyFigures {
                    label: danish_month_label(period.month()).to_string(),
                    year: period.year(),
                    month: period.month(),
                    income,
                    expenses,
                }
            })
            .collect()
    }
}

/// Short Danish month name for a 1-based month.
pub fn danish_month_label(month: u32) -> &'static str {
    DANISH_MONTHS
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::FixedRateTable;
    use crate::ledger::{Account, AccountKind, Direction, Invoice, Transaction};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn txn(
        account: Uuid,
        direction: Direction,
        amount: Decimal,
        category: Option<Category>,
        (y, m, d): (i32, u32, u32),
    ) -> Transaction {
        let mut txn = Transaction::completed(
            account,
            direction,
            amount,
            Currency::DKK,
            Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap(),
        );
        txn.category = category;
        txn
    }

    fn invoice(owner: Uuid, total: Decimal, status: InvoiceStatus) -> Invoice {
        Invoice {
            id: Uuid::new_v4(),
            owner_id: owner,
            invoice_number: "2025-001".into(),
            customer_name: "Kunde".into(),
            customer_email: "kunde@example.dk".into(),
            customer_cvr: None,
            items: Vec::new(),
            subtotal: total,
            tax: Decimal::ZERO,
            total,
            currency: Currency::DKK,
            status,
            due_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            created_at: Utc::now(),
            paid_at: None,
            amount_paid: Decimal::ZERO,
            payments: Vec::new(),
        }
    }

    fn ledger() -> (Ledger, Uuid) {
        let mut ledger = Ledger::new();
        let owner = Uuid::new_v4();
        let dkk = ledger.add_account(
            Account::new(owner, "1", Currency::DKK, AccountKind::Business).with_balance(dec!(1000)),
        );
        ledger.add_account(
            Account::new(owner, "2", Currency::EUR, AccountKind::Savings).with_balance(dec!(100)),
        );
        ledger.add_account(
            Account::new(owner, "3", Currency::USD, AccountKind::Savings).with_balance(dec!(50)),
        );
        ledger.add_transaction(txn(dkk, Direction::Incoming, dec!(900), None, (2025, 6, 2)));
        let software = Some(Category::Software);
        let rent = Some(Category::Rent);
        ledger.add_transaction(txn(dkk, Direction::Outgoing, dec!(200), software, (2025, 6, 3)));
        ledger.add_transaction(txn(dkk, Direction::Outgoing, dec!(500), rent, (2025, 4, 1)));
        ledger.add_transaction(txn(dkk, Direction::Outgoing, dec!(70), None, (2024, 11, 1)));
        ledger.add_invoice(invoice(owner, dec!(1250), InvoiceStatus::Paid));
        ledger.add_invoice(invoice(owner, dec!(400), InvoiceStatus::Overdue));
        ledger.add_invoice(invoice(owner, dec!(100), InvoiceStatus::Draft));
        (ledger, owner)
    }

    #[test]
    fn balance_converts_eur_and_skips_usd() {
        let (ledger, owner) = ledger();
        let total = AnalyticsService::total_balance(&ledger, owner, &FixedRateTable::danish_demo());
        assert_eq!(total, dec!(1750));
    }

    #[test]
    fn totals_clamp_at_the_decimal_bounds() {
        let mut ledger = Ledger::new();
        let owner = Uuid::new_v4();
        for number in ["1", "2"] {
            let account = Account::new(owner, number, Currency::DKK, AccountKind::Business)
                .with_balance(Decimal::MAX);
            let id = ledger.add_account(account);
            ledger.add_transaction(txn(id, Direction::Incoming, Decimal::MAX, None, (2025, 6, 2)));
        }
        // Overflows on conversion, so it is left out.
        ledger.add_account(
            Account::new(owner, "3", Currency::EUR, AccountKind::Savings)
                .with_balance(Decimal::MAX),
        );

        let rates = FixedRateTable::danish_demo();
        assert_eq!(AnalyticsService::total_balance(&ledger, owner, &rates), Decimal::MAX);
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let overview = AnalyticsService::overview(&ledger, owner, &DateRange::all(), &rates, today);
        assert_eq!(overview.monthly_income, Decimal::MAX);
        assert_eq!(overview.monthly_data[5].income, Decimal::MAX);
    }

    #[test]
    fn overview_totals_and_category_split() {
        let (ledger, owner) = ledger();
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let overview = AnalyticsService::overview(
            &ledger,
            owner,
            &DateRange::all(),
            &FixedRateTable::danish_demo(),
            today,
        );
        assert_eq!(overview.monthly_income, dec!(900));
        assert_eq!(overview.monthly_expenses, dec!(770));
        assert_eq!(overview.total_invoiced, dec!(1750));
        assert_eq!(overview.total_paid, dec!(1250));
        assert_eq!(overview.total_overdue, dec!(400));
        assert_eq!(overview.overdue_invoice_count, 1);
        assert_eq!(overview.account_count, 3);
        let categories: Vec<_> = overview.category_data.iter().map(|c| c.category).collect();
        assert_eq!(categories, vec![Category::Rent, Category::Software]);
    }

    #[test]
    fn trailing_series_ignores_range() {
        let (ledger, owner) = ledger();
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let june_only = DateRange::between(
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        )
        .unwrap();
        let overview = AnalyticsService::overview(
            &ledger,
            owner,
            &june_only,
            &FixedRateTable::danish_demo(),
            today,
        );
        assert_eq!(overview.monthly_expenses, dec!(200));
        let labels: Vec<_> = overview.monthly_data.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["jan", "feb", "mar", "apr", "maj", "jun"]);
        assert_eq!(overview.monthly_data[3].expenses, dec!(500));
        assert_eq!(overview.monthly_data[5].income, dec!(900));
    }

    #[test]
    fn series_crosses_year_boundary() {
        let (ledger, owner) = ledger();
        let today = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
        let overview = AnalyticsService::overview(
            &ledger,
            owner,
            &DateRange::all(),
            &FixedRateTable::danish_demo(),
            today,
        );
        let first = &overview.monthly_data[0];
        assert_eq!((first.year, first.month, first.label.as_str()), (2024, 9, "sep"));
        assert_eq!(overview.monthly_data[2].expenses, dec!(70));
    }
}
