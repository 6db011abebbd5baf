use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::constants::MAX_USERNAME_LEN;

/// Account that owns expenses and budgets
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Validate a username: 1-150 characters, letters, digits and @.+-_
    pub fn validate_username(username: &str) -> bool {
        !username.is_empty()
            && username.chars().count() <= MAX_USERNAME_LEN
            && username
                .chars()
                .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    }
}
