pub mod budget;
pub mod expense;
pub mod user;

pub use budget::Budget;
pub use expense::Expense;
pub use user::User;
