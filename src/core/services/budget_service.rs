use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::currency::checked_sum;
use crate::errors::{FinanceError, Result};
use crate::ledger::{Budget, Category, Ledger, MonthPeriod};

/// Spend health of a single budget, from the share of the limit already used.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BudgetHealth {
    Good,
    Warning,
    Danger,
    Over,
}

impl BudgetHealth {
    pub fn from_percentage(percentage: Decimal) -> Self {
        if percentage >= dec!(100) {
            BudgetHealth::Over
        } else if percentage >= dec!(90) {
            BudgetHealth::Danger
        } else if percentage >= dec!(80) {
            BudgetHealth::Warning
        } else {
            BudgetHealth::Good
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BudgetPerformance {
    pub budget_id: Uuid,
    pub category: Category,
    pub amount: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    /// Share of the budget spent, in percent with one decimal.
    pub percentage: Decimal,
    pub status: BudgetHealth,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BudgetPerformanceReport {
    pub year: i32,
    pub month: u32,
    pub budgets: Vec<BudgetPerformance>,
    pub total_budget: Decimal,
    /// All categorised spending in the month, budgeted or not.
    pub total_spent: Decimal,
}

pub struct BudgetService;

impl BudgetService {
    /// Creates a monthly budget; a second budget for the same category is a conflict.
    pub fn create(
        ledger: &mut Ledger,
        owner: Uuid,
        category: Category,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Budget> {
        Self::validate_amount(amount)?;
        if ledger
            .budgets_of(owner)
            .any(|budget| budget.category == category)
        {
            warn!(owner = %owner, category = %category, "duplicate budget rejected");
            return Err(FinanceError::Conflict(format!(
                "a budget for `{}` already exists",
                category
            )));
        }
        let budget = Budget::new(owner, category, amount, now);
        ledger.add_budget(budget.clone());
        info!(budget = %budget.id, category = %category, amount = %amount, "budget created");
        Ok(budget)
    }

    pub fn update_amount(
        ledger: &mut Ledger,
        owner: Uuid,
        id: Uuid,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Budget> {
        Self::validate_amount(amount)?;
        let budget = ledger.owned_budget_mut(owner, id)?;
        budget.amount = amount;
        budget.updated_at = now;
        let updated = budget.clone();
        ledger.touch();
        info!(budget = %id, amount = %amount, "budget updated");
        Ok(updated)
    }

    pub fn delete(ledger: &mut Ledger, owner: Uuid, id: Uuid) -> Result<Budget> {
        let position = ledger
            .budgets
            .iter()
            .position(|budget| budget.id == id && budget.owner_id == owner)
            .ok_or_else(|| FinanceError::not_found("Budget"))?;
        let removed = ledger.budgets.remove(position);
        ledger.touch();
        info!(budget = %id, "budget deleted");
        Ok(removed)
    }

    /// Budgets, most recently updated first.
    pub fn list(ledger: &Ledger, owner: Uuid) -> Vec<Budget> {
        let mut budgets: Vec<Budget> = ledger.budgets_of(owner).cloned().collect();
        budgets.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        budgets
    }

    /// Spent against budget for one calendar month. Month is 1-based and defaults,
    /// together with the year, to the month containing `today`.
    pub fn performance(
        ledger: &Ledger,
        owner: Uuid,
        month: Option<u32>,
        year: Option<i32>,
        today: NaiveDate,
    ) -> Result<BudgetPerformanceReport> {
        let period = MonthPeriod::new(
            year.unwrap_or_else(|| today.year()),
            month.unwrap_or_else(|| today.month()),
        )?;

        let spending: Vec<(Category, Decimal)> = ledger
            .transactions_of(owner)
            .filter(|txn| txn.is_outgoing() && period.contains(txn.created_at))
            .filter_map(|txn| txn.category.map(|category| (category, txn.magnitude())))
            .collect();

        let mut budgets = Vec::new();
        for budget in Self::list(ledger, owner) {
            let spent = checked_sum(
                spending
                    .iter()
                    .filter(|(category, _)| *category == budget.category)
                    .map(|(_, amount)| *amount),
            )
            .ok_or_else(|| FinanceError::out_of_range(format!("{} spending", budget.category)))?;
            let percentage = spent_percentage(spent, budget.amount)?;
            budgets.push(BudgetPerformance {
                budget_id: budget.id,
                category: budget.category,
                amount: budget.amount,
                spent,
                remaining: budget.amount - spent,
                percentage,
                status: BudgetHealth::from_percentage(percentage),
            });
        }
        budgets.sort_by(|a, b| a.category.cmp(&b.category));

        let total_budget = checked_sum(budgets.iter().map(|b| b.amount))
            .ok_or_else(|| FinanceError::out_of_range("total budget"))?;
        let total_spent = checked_sum(spending.iter().map(|(_, amount)| *amount))
            .ok_or_else(|| FinanceError::out_of_range("monthly spending"))?;
        let report = BudgetPerformanceReport {
            year: period.year(),
            month: period.month(),
            total_budget,
            total_spent,
            budgets,
        };
        debug!(
            owner = %owner,
            year = report.year,
            month = report.month,
            budgets = report.budgets.len(),
            "budget performance computed"
        );
        Ok(report)
    }

    fn validate_amount(amount: Decimal) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(FinanceError::validation("budget amount must be positive"));
        }
        Ok(())
    }
}

fn spent_percentage(spent: Decimal, amount: Decimal) -> Result<Decimal> {
    if amount.is_zero() {
        return Ok(Decimal::ZERO);
    }
    let share = spent
        .checked_div(amount)
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
        .ok_or_else(|| FinanceError::out_of_range("budget percentage"))?;
    Ok(share.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
}
