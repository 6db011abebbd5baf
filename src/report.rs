//! Spend reports and budget comparisons
//!
//! Assembles date-bounded, optionally search-filtered views over the
//! expense ledger, annotated with the budgets of the month the range
//! starts in.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::constants::{ERR_INVALID_MONTH, ERR_RANGE_ORDER};
use crate::db::{budgets, ledger};
use crate::error::{AppError, Result};
use crate::models::{Budget, Expense};

/// One category's share of a report, with its budget if one is set
#[derive(Debug, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
    pub budget: Option<Decimal>,
}

/// Overall-budget metrics for the reported month
#[derive(Debug, Serialize)]
pub struct BudgetSummary {
    pub overall_budget: Option<Decimal>,
    pub category_budgets: BTreeMap<String, Decimal>,
    pub spent: Decimal,
    /// Overall budget minus spent; absent when no overall budget is set
    pub remaining: Option<Decimal>,
}

/// View model for a date-bounded spend report
#[derive(Debug, Serialize)]
pub struct ExpenseReport {
    pub title: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_amount: Decimal,
    pub totals_by_category: Vec<CategoryTotal>,
    pub expenses: Vec<Expense>,
    pub budget_info: BudgetSummary,
    pub search: Option<String>,
}

/// A budget next to what was actually spent in its month
#[derive(Debug, Serialize)]
pub struct BudgetComparison {
    pub budget: Budget,
    pub spent: Decimal,
    /// May go negative when the budget is blown
    pub remaining: Decimal,
    pub percent_used: Decimal,
    pub is_over: bool,
}

/// First and last day of the given month; December rolls into January of
/// the next year
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month_start = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((start, next_month_start - Duration::days(1)))
}

/// Parse a `YYYY-MM` period into its month bounds
pub fn parse_period(period: &str) -> Result<(NaiveDate, NaiveDate)> {
    let invalid = || AppError::InvalidInput(ERR_INVALID_MONTH.to_string());
    let (year, month) = period.split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    month_bounds(year, month).ok_or_else(invalid)
}

/// Monday through Sunday of the week containing `day`
pub fn week_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = day - Duration::days(day.weekday().num_days_from_monday() as i64);
    (monday, monday + Duration::days(6))
}

/// Build the spend report for [start, end] inclusive
pub async fn build_report(
    pool: &SqlitePool,
    user_id: i64,
    start: NaiveDate,
    end: NaiveDate,
    search: Option<&str>,
    title: String,
) -> Result<ExpenseReport> {
    if start > end {
        return Err(AppError::InvalidInput(ERR_RANGE_ORDER.to_string()));
    }

    let expenses = ledger::expenses_in_range(pool, user_id, start, end, search).await?;

    let total: Decimal = expenses.iter().map(|e| e.amount).sum();

    let mut by_category: BTreeMap<&str, Decimal> = BTreeMap::new();
    for expense in &expenses {
        *by_category.entry(expense.category.as_str()).or_default() += expense.amount;
    }

    // Budgets apply to the month the range starts in
    let period = start.format("%Y-%m").to_string();
    let period_budgets = budgets::budgets_for_period(pool, user_id, &period).await?;

    let overall_budget = period_budgets
        .iter()
        .find(|b| b.is_overall())
        .map(|b| b.amount);
    let category_budgets: BTreeMap<String, Decimal> = period_budgets
        .iter()
        .filter(|b| !b.is_overall())
        .map(|b| (b.category.clone(), b.amount))
        .collect();

    let mut totals_by_category: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(category, subtotal)| CategoryTotal {
            budget: category_budgets.get(category).copied(),
            category: category.to_string(),
            total: subtotal,
        })
        .collect();
    totals_by_category
        .sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));

    let budget_info = BudgetSummary {
        overall_budget,
        remaining: overall_budget.map(|b| b - total),
        category_budgets,
        spent: total,
    };

    Ok(ExpenseReport {
        title,
        period_start: start,
        period_end: end,
        total_amount: total,
        totals_by_category,
        expenses,
        budget_info,
        search: search.map(str::to_string),
    })
}

/// Every budget of the user next to the month's actual spend
///
/// Category-scoped budgets count only that category's expenses; the
/// overall budget counts everything in the period.
pub async fn budget_overview(pool: &SqlitePool, user_id: i64) -> Result<Vec<BudgetComparison>> {
    let all = budgets::list_budgets(pool, user_id).await?;

    let mut comparison = Vec::with_capacity(all.len());
    for budget in all {
        let (start, end) = parse_period(&budget.period)?;
        let category = (!budget.category.is_empty()).then_some(budget.category.as_str());
        let spent = ledger::spent_in_range(pool, user_id, start, end, category).await?;

        let percent_used = if budget.amount > Decimal::ZERO {
            (spent * Decimal::ONE_HUNDRED / budget.amount).round_dp(2)
        } else {
            Decimal::ZERO
        };

        comparison.push(BudgetComparison {
            spent,
            remaining: budget.amount - spent,
            percent_used,
            is_over: spent > budget.amount,
            budget,
        });
    }

    Ok(comparison)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_bounds_interior_month() {
        let (start, end) = month_bounds(2024, 3).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
    }

    #[test]
    fn test_month_bounds_december_rolls_over() {
        let (start, end) = month_bounds(2024, 12).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }

    #[test]
    fn test_month_bounds_leap_february() {
        let (_, end) = month_bounds(2024, 2).unwrap();
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let (_, end) = month_bounds(2023, 2).unwrap();
        assert_eq!(end, NaiveDate::from_ymd_opt(2023, 2, 28).unwrap());
    }

    #[test]
    fn test_month_bounds_invalid_month() {
        assert!(month_bounds(2024, 0).is_none());
        assert!(month_bounds(2024, 13).is_none());
    }

    #[test]
    fn test_parse_period_valid() {
        let (start, end) = parse_period("2024-06").unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
    }

    #[test]
    fn test_parse_period_invalid() {
        assert!(parse_period("2024").is_err());
        assert!(parse_period("2024-13").is_err());
        assert!(parse_period("abcd-ef").is_err());
        assert!(parse_period("").is_err());
    }

    #[test]
    fn test_week_bounds_monday_through_sunday() {
        // 2024-03-13 was a Wednesday
        let wednesday = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        let (start, end) = week_bounds(wednesday);
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 3, 17).unwrap());

        // A Monday is its own week start
        let (start, _) = week_bounds(start);
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
    }
}
