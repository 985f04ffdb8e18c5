//! Database query helpers for listing a user's transactions.

use rusqlite::{Connection, named_params};

use crate::{
    Error,
    month::YearMonth,
    transaction::core::{TRANSACTION_COLUMNS, Transaction, map_transaction_row},
    user::UserID,
};

/// Narrows down which transactions [get_transactions] returns.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionFilter {
    /// Only include transactions dated within this month.
    pub month: Option<YearMonth>,
    /// Only include transactions with exactly this category.
    pub category: Option<String>,
}

impl TransactionFilter {
    /// The category value clients send to mean "every category".
    pub const ALL_CATEGORIES: &str = "all";

    /// Create a filter from the raw query values.
    ///
    /// A blank category or [TransactionFilter::ALL_CATEGORIES] matches every category.
    pub fn new(month: Option<YearMonth>, category: Option<&str>) -> Self {
        let category = category
            .map(str::trim)
            .filter(|category| !category.is_empty() && *category != Self::ALL_CATEGORIES)
            .map(str::to_owned);

        Self { month, category }
    }
}

/// Get the transactions owned by `user_id` that match `filter`.
///
/// The most recent transactions come first. Transactions on the same date are
/// ordered by when they were recorded and then by ID, newest first.
///
/// # Errors
/// Returns [Error::SqlError] if:
/// - SQL query preparation or execution fails
/// - Transaction row mapping fails
pub fn get_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let query = format!(
        "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" \
        WHERE user_id = :user_id \
        AND (:month_start IS NULL OR date BETWEEN :month_start AND :month_end) \
        AND (:category IS NULL OR category = :category) \
        ORDER BY date DESC, created_at DESC, id DESC"
    );

    connection
        .prepare(&query)?
        .query_map(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":month_start": filter.month.map(|month| month.first_day()),
                ":month_end": filter.month.map(|month| month.last_day()),
                ":category": filter.category.as_deref(),
            },
            map_transaction_row,
        )?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}
