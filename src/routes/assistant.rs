use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::constants::{ERR_CATEGORY_REQUIRED, ERR_CATEGORY_TOO_LONG, ERR_INVALID_AMOUNT};
use crate::db::ledger::{self, IngestOutcome};
use crate::db::users;
use crate::error::{AppError, Result};
use crate::models::{Expense, User};
use crate::security::require_assistant_token;
use crate::AppState;

/// Payload accepted by the add-expense endpoint, from a JSON body or query
/// parameters. Unknown fields are rejected outright; required fields are
/// validated by hand so the error names the offending one.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddExpenseRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub amount: Option<String>,
    pub category: Option<String>,
    pub note: Option<String>,
    pub request_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddExpenseResponse {
    pub ok: bool,
    pub message: String,
    pub expense_id: Option<i64>,
    pub created_at: Option<String>,
}

/// Liveness probe for the voice-assistant shortcut; bearer token only
pub async fn ping(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>> {
    require_assistant_token(&state.config, &headers)?;
    Ok(Json(json!({ "ok": true, "message": "pong" })))
}

/// Record an expense from the voice-assistant shortcut (JSON body)
///
/// Authentication is two-layered: the shared bearer secret proves the
/// request came through the shortcut, then the owner's username/password
/// select whose ledger the expense lands in. The bearer check runs first
/// and short-circuits; the response never says which layer failed.
///
/// Supplying a `request_id` makes the call idempotent: replays of an
/// already-accepted id return success with null identifiers and write
/// nothing.
pub async fn add_expense(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: std::result::Result<Json<AddExpenseRequest>, JsonRejection>,
) -> Result<Json<AddExpenseResponse>> {
    require_assistant_token(&state.config, &headers)?;

    let Json(payload) = payload.map_err(|e| {
        tracing::warn!("Malformed add-expense body: {}", e);
        AppError::InvalidInput("Invalid JSON".to_string())
    })?;

    process_add_expense(&state, payload).await
}

/// Query-parameter variant of `add_expense`, kept for shortcut debugging
pub async fn add_expense_query(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: std::result::Result<Query<AddExpenseRequest>, QueryRejection>,
) -> Result<Json<AddExpenseResponse>> {
    require_assistant_token(&state.config, &headers)?;

    let Query(payload) = params.map_err(|e| {
        tracing::warn!("Malformed add-expense query: {}", e);
        AppError::InvalidInput("Invalid query parameters".to_string())
    })?;

    process_add_expense(&state, payload).await
}

async fn process_add_expense(
    state: &AppState,
    payload: AddExpenseRequest,
) -> Result<Json<AddExpenseResponse>> {
    let owner = authenticate_owner(state, &payload).await?;

    let amount = payload
        .amount
        .as_deref()
        .and_then(Expense::parse_amount)
        .ok_or_else(|| AppError::InvalidInput(ERR_INVALID_AMOUNT.to_string()))?;

    let category = payload.category.as_deref().unwrap_or("").trim();
    if category.is_empty() {
        return Err(AppError::InvalidInput(ERR_CATEGORY_REQUIRED.to_string()));
    }
    if !Expense::validate_category(category) {
        return Err(AppError::InvalidInput(ERR_CATEGORY_TOO_LONG.to_string()));
    }

    let note = payload.note.as_deref().unwrap_or("");

    let outcome = ledger::create_with_receipt(
        &state.pool,
        owner.id,
        amount,
        category,
        note,
        payload.request_id.as_deref(),
    )
    .await?;

    let response = match outcome {
        IngestOutcome::Created(expense) => {
            tracing::info!(
                "Added expense for {}: ${} to {}",
                owner.username,
                expense.amount,
                expense.category
            );
            AddExpenseResponse {
                ok: true,
                message: format!("Added expense ${} to {}", expense.amount, expense.category),
                expense_id: Some(expense.id),
                created_at: Some(expense.created_at.to_rfc3339()),
            }
        }
        IngestOutcome::AlreadyProcessed => AddExpenseResponse {
            ok: true,
            message: "Already processed".to_string(),
            expense_id: None,
            created_at: None,
        },
    };

    Ok(Json(response))
}

/// Validate the owner credentials carried in the payload
async fn authenticate_owner(state: &AppState, payload: &AddExpenseRequest) -> Result<User> {
    let (Some(username), Some(password)) =
        (payload.username.as_deref(), payload.password.as_deref())
    else {
        tracing::warn!("Missing username or password");
        return Err(AppError::Unauthorized);
    };

    match users::verify_credentials(&state.pool, username, password).await? {
        Some(user) => Ok(user),
        None => {
            tracing::warn!("Owner authentication failed for username: {}", username);
            Err(AppError::Unauthorized)
        }
    }
}
