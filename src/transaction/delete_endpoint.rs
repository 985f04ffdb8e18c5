use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use crate::{
    Error,
    database_id::TransactionId,
    transaction::{TransactionState, core::delete_transaction},
    user::UserID,
};

/// A route handler for deleting a transaction, responds with a confirmation message.
///
/// # Errors
///
/// Returns [Error::DeleteMissingTransaction] if the transaction does not exist
/// or belongs to another user.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Value>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_transaction(transaction_id, user_id, &connection)?;
    tracing::info!("user {user_id} deleted transaction {transaction_id}");

    Ok(Json(json!({ "message": "Transaction deleted" })))
}
