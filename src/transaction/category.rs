//! The category names suggested to clients when recording a transaction.

use axum::Json;
use serde::Serialize;

/// Suggested categories for expenses.
pub const EXPENSE_CATEGORIES: [&str; 10] = [
    "Food",
    "Transport",
    "Entertainment",
    "Health",
    "Clothing",
    "Education",
    "Rent",
    "Utilities",
    "Investment",
    "Other",
];

/// Suggested categories for income.
pub const INCOME_CATEGORIES: [&str; 5] = ["Salary", "Freelance", "Investment", "Gift", "Other"];

/// The suggested category names for each transaction type.
///
/// These are only suggestions, transactions may use any category name.
#[derive(Debug, Serialize)]
pub struct Categories {
    expense: &'static [&'static str],
    income: &'static [&'static str],
}

/// A route handler that lists the suggested categories.
pub async fn get_categories() -> Json<Categories> {
    Json(Categories {
        expense: &EXPENSE_CATEGORIES,
        income: &INCOME_CATEGORIES,
    })
}
