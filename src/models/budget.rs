use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// A monthly spending limit
///
/// At most one budget exists per (user, period, category); an empty
/// category is the overall budget for the period.
#[derive(Debug, Clone, Serialize)]
pub struct Budget {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: i64,
    /// Calendar month, `YYYY-MM`
    pub period: String,
    pub category: String,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Budget {
    /// True when this is the overall budget for its period
    pub fn is_overall(&self) -> bool {
        self.category.is_empty()
    }
}
