/// Maximum length of an expense or budget category
pub const MAX_CATEGORY_LEN: usize = 80;

/// Maximum length of a username at registration
pub const MAX_USERNAME_LEN: usize = 150;

/// Minimum password length for new accounts
pub const MIN_PASSWORD_LEN: usize = 8;

/// Endpoint name recorded with each ingestion receipt.
/// Request ids are scoped per endpoint, so a future second ingestion
/// endpoint can accept the same id without colliding.
pub const ADD_EXPENSE_ENDPOINT: &str = "add-expense";

// =============================================================================
// Error Messages
// =============================================================================

/// Error message for a missing, non-numeric, or non-positive amount
pub const ERR_INVALID_AMOUNT: &str = "Invalid amount: must be a positive number";

/// Error message for a malformed or negative budget amount
pub const ERR_INVALID_BUDGET_AMOUNT: &str = "Invalid amount: must be a non-negative number";

/// Error message for a missing category
pub const ERR_CATEGORY_REQUIRED: &str = "Category is required";

/// Error message for an over-long category
pub const ERR_CATEGORY_TOO_LONG: &str = "Category too long (max 80 characters)";

/// Error message for an unparseable budget period
pub const ERR_INVALID_MONTH: &str = "Invalid month format. Use YYYY-MM";

/// Error message for an unparseable report date
pub const ERR_INVALID_DATE: &str = "Invalid date format. Use YYYY-MM-DD";

/// Error message for an inverted report range
pub const ERR_RANGE_ORDER: &str = "start must be before or equal to end";
