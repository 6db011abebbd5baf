use std::str::FromStr;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{ERR_CATEGORY_TOO_LONG, ERR_INVALID_BUDGET_AMOUNT};
use crate::db::budgets;
use crate::error::{AppError, Result};
use crate::models::Expense;
use crate::report::{self, BudgetComparison};
use crate::routes::reports::require_user;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct BudgetsOverview {
    pub budgets: Vec<BudgetComparison>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BudgetActionRequest {
    pub action: String,
    pub period: Option<String>,
    pub category: Option<String>,
    pub amount: Option<String>,
    pub budget_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct BudgetActionResponse {
    pub ok: bool,
    pub message: String,
}

/// All budgets of the caller, each next to its month's actual spend
pub async fn list_budgets(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<BudgetsOverview>> {
    let user = require_user(&state, &headers).await?;
    let budgets = report::budget_overview(&state.pool, user.id).await?;
    Ok(Json(BudgetsOverview { budgets }))
}

/// Budget management actions: `add` (upsert) or `delete`
pub async fn budget_action(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<BudgetActionRequest>,
) -> Result<Json<BudgetActionResponse>> {
    let user = require_user(&state, &headers).await?;

    match payload.action.as_str() {
        "add" => {
            let raw_period = payload.period.as_deref().unwrap_or("").trim();
            // Reports look budgets up by the canonical YYYY-MM key, so the
            // stored period is re-derived from the parsed month
            let (month_start, _) = report::parse_period(raw_period)?;
            let period = month_start.format("%Y-%m").to_string();

            let category = payload.category.as_deref().unwrap_or("").trim();
            if !category.is_empty() && !Expense::validate_category(category) {
                return Err(AppError::InvalidInput(ERR_CATEGORY_TOO_LONG.to_string()));
            }

            // Zero is a valid budget (tracked but nothing allotted)
            let amount = payload
                .amount
                .as_deref()
                .and_then(|raw| Decimal::from_str(raw.trim()).ok())
                .filter(|a| !a.is_sign_negative())
                .ok_or_else(|| AppError::InvalidInput(ERR_INVALID_BUDGET_AMOUNT.to_string()))?;

            let budget =
                budgets::upsert_budget(&state.pool, user.id, &period, category, amount).await?;

            tracing::info!(
                "Budget saved for {}: {} {} = {}",
                user.username,
                budget.period,
                if budget.category.is_empty() {
                    "overall"
                } else {
                    &budget.category
                },
                budget.amount
            );

            Ok(Json(BudgetActionResponse {
                ok: true,
                message: "Budget saved".to_string(),
            }))
        }
        "delete" => {
            let Some(budget_id) = payload.budget_id else {
                return Err(AppError::InvalidInput("budget_id is required".to_string()));
            };

            // Unknown or foreign ids are nothing to do, not an error
            budgets::delete_budget(&state.pool, user.id, budget_id).await?;

            Ok(Json(BudgetActionResponse {
                ok: true,
                message: "Budget deleted".to_string(),
            }))
        }
        other => Err(AppError::InvalidInput(format!("Unknown action: {}", other))),
    }
}
