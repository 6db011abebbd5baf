pub mod budgets;
pub mod ledger;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Create a SQLite connection pool
///
/// Creates the database file on first run; foreign keys are enforced so
/// expense and budget rows cannot outlive their owner.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    tracing::info!("Creating database connection pool...");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await?;

    tracing::info!("Database connection pool created successfully");

    Ok(pool)
}

/// Decode a stored TEXT amount into a fixed-point decimal
pub(crate) fn decode_amount(raw: &str) -> Result<Decimal, sqlx::Error> {
    Decimal::from_str(raw)
        .map_err(|e| sqlx::Error::Decode(format!("Invalid decimal amount: {}", e).into()))
}
