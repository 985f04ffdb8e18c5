//! Defines the endpoints for reading transactions.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::{
    Error,
    database_id::TransactionId,
    month::parse_optional_month,
    transaction::{
        Transaction, TransactionState,
        core::get_transaction,
        query::{TransactionFilter, get_transactions},
    },
    user::UserID,
};

/// The query parameters for listing transactions.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    /// Only list transactions within this month, formatted as `YYYY-MM`.
    pub month: Option<String>,
    /// Only list transactions in this category, "all" lists every category.
    pub category: Option<String>,
}

/// A route handler that lists the user's transactions, most recent first.
///
/// # Errors
///
/// Returns [Error::InvalidMonth] if the month is not formatted as `YYYY-MM`.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let month = parse_optional_month(query.month.as_deref())?;
    let filter = TransactionFilter::new(month, query.category.as_deref());

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_transactions(user_id, &filter, &connection).map(Json)
}

/// A route handler for getting a single transaction.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Transaction>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_transaction(transaction_id, user_id, &connection).map(Json)
}
