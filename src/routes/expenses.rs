use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::constants::{ERR_CATEGORY_TOO_LONG, ERR_INVALID_AMOUNT};
use crate::db::ledger;
use crate::error::{AppError, Result};
use crate::models::Expense;
use crate::routes::reports::require_user;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpenseActionRequest {
    pub action: String,
    pub expense_id: Option<i64>,
    pub category: Option<String>,
    pub amount: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExpenseActionResponse {
    pub ok: bool,
    pub message: String,
}

/// Expense edit actions: `update` or `delete`, scoped to the caller
///
/// Ids that do not exist or belong to someone else are a silent no-op.
/// Updates touch only the provided fields; an empty category means
/// "leave it alone", matching the web form's blank inputs.
pub async fn expense_action(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ExpenseActionRequest>,
) -> Result<Json<ExpenseActionResponse>> {
    let user = require_user(&state, &headers).await?;

    let Some(expense_id) = payload.expense_id else {
        return Err(AppError::InvalidInput("expense_id is required".to_string()));
    };

    match payload.action.as_str() {
        "update" => {
            let category = match payload.category.as_deref().map(str::trim) {
                Some("") | None => None,
                Some(cat) if !Expense::validate_category(cat) => {
                    return Err(AppError::InvalidInput(ERR_CATEGORY_TOO_LONG.to_string()))
                }
                Some(cat) => Some(cat),
            };

            let amount = match payload.amount.as_deref() {
                None => None,
                Some(raw) => Some(
                    Expense::parse_amount(raw)
                        .ok_or_else(|| AppError::InvalidInput(ERR_INVALID_AMOUNT.to_string()))?,
                ),
            };

            ledger::update_expense(
                &state.pool,
                user.id,
                expense_id,
                category,
                amount,
                payload.note.as_deref(),
            )
            .await?;

            Ok(Json(ExpenseActionResponse {
                ok: true,
                message: "Expense updated".to_string(),
            }))
        }
        "delete" => {
            ledger::delete_expense(&state.pool, user.id, expense_id).await?;

            Ok(Json(ExpenseActionResponse {
                ok: true,
                message: "Expense deleted".to_string(),
            }))
        }
        other => Err(AppError::InvalidInput(format!("Unknown action: {}", other))),
    }
}
