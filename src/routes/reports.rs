use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;

use crate::constants::ERR_INVALID_DATE;
use crate::db::users;
use crate::error::{AppError, Result};
use crate::models::User;
use crate::report::{self, ExpenseReport};
use crate::security::basic_credentials;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportParams {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RangeParams {
    pub start: Option<String>,
    pub end: Option<String>,
    pub search: Option<String>,
}

/// Resolve the Basic credentials on a request to an account
pub(crate) async fn require_user(state: &AppState, headers: &HeaderMap) -> Result<User> {
    let Some((username, password)) = basic_credentials(headers) else {
        tracing::warn!("Missing or malformed Basic credentials");
        return Err(AppError::Unauthorized);
    };

    match users::verify_credentials(&state.pool, &username, &password).await? {
        Some(user) => Ok(user),
        None => {
            tracing::warn!("Authentication failed for username: {}", username);
            Err(AppError::Unauthorized)
        }
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::InvalidInput(ERR_INVALID_DATE.to_string()))
}

/// Today's expenses
pub async fn report_today(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ReportParams>,
) -> Result<Json<ExpenseReport>> {
    let user = require_user(&state, &headers).await?;
    let today = Utc::now().date_naive();

    let report = report::build_report(
        &state.pool,
        user.id,
        today,
        today,
        params.search.as_deref(),
        "Today's Expenses".to_string(),
    )
    .await?;

    Ok(Json(report))
}

/// This week's expenses, Monday through Sunday
pub async fn report_week(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ReportParams>,
) -> Result<Json<ExpenseReport>> {
    let user = require_user(&state, &headers).await?;
    let (start, end) = report::week_bounds(Utc::now().date_naive());

    let report = report::build_report(
        &state.pool,
        user.id,
        start,
        end,
        params.search.as_deref(),
        "This Week's Expenses".to_string(),
    )
    .await?;

    Ok(Json(report))
}

/// The current month, from the 1st through today
pub async fn report_current_month(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ReportParams>,
) -> Result<Json<ExpenseReport>> {
    let user = require_user(&state, &headers).await?;
    let today = Utc::now().date_naive();
    let start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today);

    let report = report::build_report(
        &state.pool,
        user.id,
        start,
        today,
        params.search.as_deref(),
        "Current Month Expenses".to_string(),
    )
    .await?;

    Ok(Json(report))
}

/// A specific month, `YYYY-MM`
pub async fn report_month(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(period): Path<String>,
    Query(params): Query<ReportParams>,
) -> Result<Json<ExpenseReport>> {
    let user = require_user(&state, &headers).await?;
    let (start, end) = report::parse_period(&period)?;
    let title = format!("Expenses for {}", start.format("%B %Y"));

    let report = report::build_report(
        &state.pool,
        user.id,
        start,
        end,
        params.search.as_deref(),
        title,
    )
    .await?;

    Ok(Json(report))
}

/// A custom inclusive date range
pub async fn report_range(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<RangeParams>,
) -> Result<Json<ExpenseReport>> {
    let user = require_user(&state, &headers).await?;

    let (Some(start_raw), Some(end_raw)) = (params.start.as_deref(), params.end.as_deref()) else {
        return Err(AppError::InvalidInput(
            "start and end are required".to_string(),
        ));
    };

    let start = parse_date(start_raw)?;
    let end = parse_date(end_raw)?;
    let title = format!(
        "Expenses from {} to {}",
        start.format("%B %d, %Y"),
        end.format("%B %d, %Y")
    );

    let report = report::build_report(
        &state.pool,
        user.id,
        start,
        end,
        params.search.as_deref(),
        title,
    )
    .await?;

    Ok(Json(report))
}
