pub mod assistant;
pub mod budgets;
pub mod expenses;
pub mod health;
pub mod register;
pub mod reports;

pub use assistant::{add_expense, add_expense_query, ping};
pub use budgets::{budget_action, list_budgets};
pub use expenses::expense_action;
pub use health::health_check;
pub use register::register_user;
pub use reports::{report_current_month, report_month, report_range, report_today, report_week};

use axum::routing::{get, post};
use axum::Router;

use crate::AppState;

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/ping", get(ping))
        .route("/api/add-expense", get(add_expense_query).post(add_expense))
        .route("/api/register", post(register_user))
        .route("/api/reports/today", get(report_today))
        .route("/api/reports/week", get(report_week))
        .route("/api/reports/month", get(report_current_month))
        .route("/api/reports/month/:period", get(report_month))
        .route("/api/reports/range", get(report_range))
        .route("/api/expenses", post(expense_action))
        .route("/api/budgets", get(list_budgets).post(budget_action))
        .with_state(state)
}
