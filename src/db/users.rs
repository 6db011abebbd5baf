use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::error::{AppError, Result};
use crate::models::User;
use crate::security::{generate_salt, hash_password, verify_password};

/// Create a new account, digesting the password with a fresh salt
///
/// A duplicate username surfaces as `UserAlreadyExists` via the UNIQUE
/// constraint rather than a pre-check.
pub async fn create_user(pool: &SqlitePool, username: &str, password: &str) -> Result<User> {
    let salt = generate_salt();
    let digest = hash_password(&salt, password);
    let created_at = Utc::now();

    let result = sqlx::query(
        "INSERT INTO users (username, password_salt, password_hash, created_at) \
         VALUES (?, ?, ?, ?)",
    )
    .bind(username)
    .bind(&salt)
    .bind(&digest)
    .bind(created_at)
    .execute(pool)
    .await;

    match result {
        Ok(done) => Ok(User {
            id: done.last_insert_rowid(),
            username: username.to_string(),
            created_at,
        }),
        Err(e) if e.as_database_error().is_some_and(|d| d.is_unique_violation()) => {
            tracing::info!("Registration rejected, username taken: {}", username);
            Err(AppError::UserAlreadyExists)
        }
        Err(e) => Err(e.into()),
    }
}

/// Check a username/password pair against the stored digest
///
/// Returns `None` for unknown users and wrong passwords alike.
pub async fn verify_credentials(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<Option<User>> {
    let row = sqlx::query(
        "SELECT id, username, password_salt, password_hash, created_at \
         FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let salt: String = row.try_get("password_salt")?;
    let digest: String = row.try_get("password_hash")?;
    if !verify_password(&salt, &digest, password) {
        return Ok(None);
    }

    Ok(Some(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        created_at: row.try_get("created_at")?,
    }))
}
