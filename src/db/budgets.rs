use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::db::decode_amount;
use crate::error::Result;
use crate::models::Budget;

fn budget_from_row(row: &SqliteRow) -> std::result::Result<Budget, sqlx::Error> {
    let amount_text: String = row.try_get("amount")?;
    Ok(Budget {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        period: row.try_get("period")?,
        category: row.try_get("category")?,
        amount: decode_amount(&amount_text)?,
        created_at: row.try_get("created_at")?,
    })
}

/// Create or replace the budget for (user, period, category)
///
/// Re-adding an existing triple updates the amount in place; the original
/// creation timestamp is kept.
pub async fn upsert_budget(
    pool: &SqlitePool,
    user_id: i64,
    period: &str,
    category: &str,
    amount: Decimal,
) -> Result<Budget> {
    let row = sqlx::query(
        "INSERT INTO budgets (user_id, period, category, amount, created_at) \
         VALUES (?, ?, ?, ?, ?) \
         ON CONFLICT(user_id, period, category) DO UPDATE SET amount = excluded.amount \
         RETURNING id, user_id, period, category, amount, created_at",
    )
    .bind(user_id)
    .bind(period)
    .bind(category)
    .bind(amount.to_string())
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    budget_from_row(&row).map_err(Into::into)
}

/// Delete one of the user's own budgets; unknown or foreign ids are a no-op
pub async fn delete_budget(pool: &SqlitePool, user_id: i64, budget_id: i64) -> Result<bool> {
    let done = sqlx::query("DELETE FROM budgets WHERE id = ? AND user_id = ?")
        .bind(budget_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(done.rows_affected() > 0)
}

/// All budgets of a user, newest period first
pub async fn list_budgets(pool: &SqlitePool, user_id: i64) -> Result<Vec<Budget>> {
    let rows = sqlx::query(
        "SELECT id, user_id, period, category, amount, created_at \
         FROM budgets WHERE user_id = ? \
         ORDER BY period DESC, created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(budget_from_row)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Into::into)
}

/// Budgets applying to a single period
pub async fn budgets_for_period(
    pool: &SqlitePool,
    user_id: i64,
    period: &str,
) -> Result<Vec<Budget>> {
    let rows = sqlx::query(
        "SELECT id, user_id, period, category, amount, created_at \
         FROM budgets WHERE user_id = ? AND period = ?",
    )
    .bind(user_id)
    .bind(period)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(budget_from_row)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Into::into)
}
