//! Aggregates a user's transactions into totals, balances and category breakdowns.
//!
//! The totals are computed by SQLite. The pure helpers at the bottom of this
//! module reshape the aggregated rows for the charts.

use rusqlite::{Connection, named_params};
use serde::{Deserialize, Serialize};
use time::macros::format_description;

use crate::{
    Error,
    month::YearMonth,
    transaction::TransactionType,
    user::UserID,
};

/// The number of categories shown in the "top categories" chart.
pub const TOP_CATEGORY_COUNT: usize = 6;

/// The total amount of one transaction type within one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// The category name.
    pub category: String,
    /// Whether the total is income or expenses.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The sum of the transaction amounts, always positive.
    pub total: f64,
}

/// Aggregated totals for a user, optionally restricted to a single month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// The month the summary covers, or `None` for all time.
    pub month: Option<YearMonth>,
    /// The sum of all income in the period.
    pub total_income: f64,
    /// The sum of all expenses in the period.
    pub total_expense: f64,
    /// Income minus expenses over every transaction up to the end of the period.
    pub balance: f64,
    /// Totals per category and type, largest first.
    pub by_category: Vec<CategoryTotal>,
}

impl Summary {
    /// Whether there were no transactions in the period.
    pub fn is_empty(&self) -> bool {
        self.by_category.is_empty()
    }
}

/// The income and expense totals for a single month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    /// The month the totals are for.
    pub month: YearMonth,
    /// The sum of all income in the month.
    pub income: f64,
    /// The sum of all expenses in the month.
    pub expense: f64,
    /// Income minus expenses.
    pub net: f64,
}

/// Compute the summary of the transactions owned by `user_id`.
///
/// With a `month`, the income and expense totals and the category breakdown
/// only count transactions dated within that month, while the balance counts
/// every transaction up to and including the last day of the month. Without a
/// month, everything is counted.
///
/// # Errors
/// Returns [Error::SqlError] if an SQL query fails.
pub fn get_summary(
    user_id: UserID,
    month: Option<YearMonth>,
    connection: &Connection,
) -> Result<Summary, Error> {
    let month_start = month.map(|month| month.first_day());
    let month_end = month.map(|month| month.last_day());

    let (total_income, total_expense) = connection
        .prepare(
            "SELECT
                COALESCE(SUM(CASE WHEN type = 'income' THEN amount ELSE 0 END), 0.0),
                COALESCE(SUM(CASE WHEN type = 'expense' THEN amount ELSE 0 END), 0.0)
            FROM \"transaction\"
            WHERE user_id = :user_id
            AND (:month_start IS NULL OR date BETWEEN :month_start AND :month_end)",
        )?
        .query_row(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":month_start": month_start,
                ":month_end": month_end,
            },
            |row| Ok((row.get::<_, f64>(0)?, row.get::<_, f64>(1)?)),
        )?;

    let balance: f64 = connection
        .prepare(
            "SELECT COALESCE(SUM(CASE WHEN type = 'income' THEN amount ELSE -amount END), 0.0)
            FROM \"transaction\"
            WHERE user_id = :user_id
            AND (:month_end IS NULL OR date <= :month_end)",
        )?
        .query_row(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":month_end": month_end,
            },
            |row| row.get(0),
        )?;

    let by_category = connection
        .prepare(
            "SELECT category, type, SUM(amount) AS total
            FROM \"transaction\"
            WHERE user_id = :user_id
            AND (:month_start IS NULL OR date BETWEEN :month_start AND :month_end)
            GROUP BY category, type
            ORDER BY total DESC, category ASC",
        )?
        .query_map(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":month_start": month_start,
                ":month_end": month_end,
            },
            |row| {
                Ok(CategoryTotal {
                    category: row.get(0)?,
                    transaction_type: row.get(1)?,
                    total: row.get(2)?,
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Summary {
        month,
        total_income,
        total_expense,
        balance,
        by_category,
    })
}

/// Get the income, expense and net totals of each month with transactions,
/// oldest month first.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query fails.
pub fn get_monthly_totals(user_id: UserID, connection: &Connection) -> Result<Vec<MonthlyTotal>, Error> {
    let rows = connection
        .prepare(
            "SELECT
                strftime('%Y-%m', date) AS month,
                COALESCE(SUM(CASE WHEN type = 'income' THEN amount ELSE 0 END), 0.0),
                COALESCE(SUM(CASE WHEN type = 'expense' THEN amount ELSE 0 END), 0.0)
            FROM \"transaction\"
            WHERE user_id = :user_id
            GROUP BY month
            ORDER BY month ASC",
        )?
        .query_map(named_params! { ":user_id": user_id.as_i64() }, |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, f64>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(raw_month, income, expense)| {
            let month = raw_month.parse::<YearMonth>().inspect_err(|error| {
                tracing::error!("could not parse month {raw_month} from the database: {error}")
            })?;

            Ok(MonthlyTotal {
                month,
                income,
                expense,
                net: income - expense,
            })
        })
        .collect()
}

/// The expense totals of each category, largest first.
///
/// # Returns
/// Vector of (category, total) pairs for the expense rows of `by_category`.
pub fn expenses_by_category(by_category: &[CategoryTotal]) -> Vec<(String, f64)> {
    let mut expenses: Vec<(String, f64)> = by_category
        .iter()
        .filter(|row| row.transaction_type == TransactionType::Expense)
        .map(|row| (row.category.clone(), row.total))
        .collect();

    expenses.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    expenses
}

/// The `count` largest category totals regardless of type, largest first.
pub fn top_categories(by_category: &[CategoryTotal], count: usize) -> Vec<CategoryTotal> {
    let mut sorted = by_category.to_vec();
    sorted.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });
    sorted.truncate(count);
    sorted
}

/// Formats a month as a short label, e.g. "Mar 2024".
pub fn format_month_label(month: YearMonth) -> String {
    month
        .first_day()
        .format(format_description!("[month repr:short] [year]"))
        .unwrap_or_else(|_| month.to_string())
}
