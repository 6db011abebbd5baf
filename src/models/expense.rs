use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::constants::MAX_CATEGORY_LEN;

/// A single recorded expense
///
/// The creation timestamp is assigned server-side and never changes;
/// amount, category and note may be edited by the owner.
#[derive(Debug, Clone, Serialize)]
pub struct Expense {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub amount: Decimal,
    pub category: String,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Parse a strictly positive decimal amount
    ///
    /// Zero, negative, and non-numeric input all come back as `None`.
    pub fn parse_amount(raw: &str) -> Option<Decimal> {
        let amount = Decimal::from_str(raw.trim()).ok()?;
        (amount > Decimal::ZERO).then_some(amount)
    }

    /// Validate an already-trimmed category label
    pub fn validate_category(category: &str) -> bool {
        !category.is_empty() && category.chars().count() <= MAX_CATEGORY_LEN
    }
}
