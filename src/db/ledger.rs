use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::constants::ADD_EXPENSE_ENDPOINT;
use crate::db::decode_amount;
use crate::error::Result;
use crate::models::Expense;

/// Outcome of an idempotent ingestion write
#[derive(Debug)]
pub enum IngestOutcome {
    Created(Expense),
    AlreadyProcessed,
}

fn expense_from_row(row: &SqliteRow) -> std::result::Result<Expense, sqlx::Error> {
    let amount_text: String = row.try_get("amount")?;
    Ok(Expense {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        amount: decode_amount(&amount_text)?,
        category: row.try_get("category")?,
        note: row.try_get("note")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Escape LIKE wildcards in a user-supplied search term
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Record an ingested expense, deduplicating on the caller's request id
///
/// The receipt insert goes first, inside the same transaction as the
/// expense insert; a unique violation on the receipt means this request id
/// was already processed and nothing else is written. Both rows land or
/// neither does.
pub async fn create_with_receipt(
    pool: &SqlitePool,
    user_id: i64,
    amount: Decimal,
    category: &str,
    note: &str,
    request_id: Option<&str>,
) -> Result<IngestOutcome> {
    let mut tx = pool.begin().await?;
    let now = Utc::now();

    if let Some(request_id) = request_id {
        let inserted = sqlx::query(
            "INSERT INTO ingestion_receipts (request_id, endpoint, created_at) \
             VALUES (?, ?, ?)",
        )
        .bind(request_id)
        .bind(ADD_EXPENSE_ENDPOINT)
        .bind(now)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            Err(e) if e.as_database_error().is_some_and(|d| d.is_unique_violation()) => {
                tx.rollback().await?;
                tracing::info!("Duplicate ingestion request: {}", request_id);
                return Ok(IngestOutcome::AlreadyProcessed);
            }
            Err(e) => return Err(e.into()),
        }
    }

    let done = sqlx::query(
        "INSERT INTO expenses (user_id, amount, category, note, created_at) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(amount.to_string())
    .bind(category)
    .bind(note)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    let id = done.last_insert_rowid();

    tx.commit().await?;

    Ok(IngestOutcome::Created(Expense {
        id,
        user_id,
        amount,
        category: category.to_string(),
        note: note.to_string(),
        created_at: now,
    }))
}

/// A user's expenses within [start, end] by calendar date, newest first
///
/// With a search term, only expenses whose category or note contains the
/// term (case-insensitively) are returned.
pub async fn expenses_in_range(
    pool: &SqlitePool,
    user_id: i64,
    start: NaiveDate,
    end: NaiveDate,
    search: Option<&str>,
) -> Result<Vec<Expense>> {
    let rows = match search {
        Some(term) => {
            let pattern = like_pattern(term);
            sqlx::query(
                "SELECT id, user_id, amount, category, note, created_at \
                 FROM expenses \
                 WHERE user_id = ? \
                   AND date(created_at) BETWEEN ? AND ? \
                   AND (category LIKE ? ESCAPE '\\' OR note LIKE ? ESCAPE '\\') \
                 ORDER BY created_at DESC, id DESC",
            )
            .bind(user_id)
            .bind(start)
            .bind(end)
            .bind(&pattern)
            .bind(&pattern)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(
                "SELECT id, user_id, amount, category, note, created_at \
                 FROM expenses \
                 WHERE user_id = ? \
                   AND date(created_at) BETWEEN ? AND ? \
                 ORDER BY created_at DESC, id DESC",
            )
            .bind(user_id)
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await?
        }
    };

    rows.iter()
        .map(expense_from_row)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Into::into)
}

/// Sum of a user's expense amounts within [start, end], optionally scoped
/// to a single category
pub async fn spent_in_range(
    pool: &SqlitePool,
    user_id: i64,
    start: NaiveDate,
    end: NaiveDate,
    category: Option<&str>,
) -> Result<Decimal> {
    let rows = match category {
        Some(cat) => {
            sqlx::query(
                "SELECT amount FROM expenses \
                 WHERE user_id = ? AND date(created_at) BETWEEN ? AND ? AND category = ?",
            )
            .bind(user_id)
            .bind(start)
            .bind(end)
            .bind(cat)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(
                "SELECT amount FROM expenses \
                 WHERE user_id = ? AND date(created_at) BETWEEN ? AND ?",
            )
            .bind(user_id)
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await?
        }
    };

    let mut total = Decimal::ZERO;
    for row in &rows {
        let amount_text: String = row.try_get("amount")?;
        total += decode_amount(&amount_text)?;
    }
    Ok(total)
}

/// Fetch one of the user's own expenses
pub async fn find_expense(
    pool: &SqlitePool,
    user_id: i64,
    expense_id: i64,
) -> Result<Option<Expense>> {
    let row = sqlx::query(
        "SELECT id, user_id, amount, category, note, created_at \
         FROM expenses WHERE id = ? AND user_id = ?",
    )
    .bind(expense_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref()
        .map(expense_from_row)
        .transpose()
        .map_err(Into::into)
}

/// Update an owned expense's mutable fields, keeping the original value
/// for any field not provided. Unknown or foreign ids are a no-op.
pub async fn update_expense(
    pool: &SqlitePool,
    user_id: i64,
    expense_id: i64,
    category: Option<&str>,
    amount: Option<Decimal>,
    note: Option<&str>,
) -> Result<bool> {
    let Some(existing) = find_expense(pool, user_id, expense_id).await? else {
        return Ok(false);
    };

    let category = category.unwrap_or(&existing.category);
    let amount = amount.unwrap_or(existing.amount);
    let note = note.unwrap_or(&existing.note);

    sqlx::query("UPDATE expenses SET amount = ?, category = ?, note = ? WHERE id = ? AND user_id = ?")
        .bind(amount.to_string())
        .bind(category)
        .bind(note)
        .bind(expense_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(true)
}

/// Delete an owned expense; unknown or foreign ids are a no-op
pub async fn delete_expense(pool: &SqlitePool, user_id: i64, expense_id: i64) -> Result<bool> {
    let done = sqlx::query("DELETE FROM expenses WHERE id = ? AND user_id = ?")
        .bind(expense_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(done.rows_affected() > 0)
}
