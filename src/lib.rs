//! Gastos is a web service for tracking personal income and expenses.
//!
//! This library provides a JSON REST API for registering users, recording
//! transactions and reading back aggregated summaries and chart options.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod database_id;
mod db;
pub mod endpoints;
mod logging;
mod month;
mod password;
mod routing;
mod summary;
#[cfg(test)]
mod test_utils;
mod transaction;
mod user;

pub use app_state::{AppState, DEFAULT_TOKEN_DURATION};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use month::YearMonth;
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use summary::{
    CategoryTotal, MonthlyTotal, Summary, SummaryChart, build_summary_charts, get_monthly_totals,
    get_summary,
};
pub use transaction::{
    EXPENSE_CATEGORIES, INCOME_CATEGORIES, NewTransaction, Transaction, TransactionFilter,
    TransactionType, create_transaction, delete_transaction, get_transaction, get_transactions,
};
pub use user::{
    User, UserID, Username, count_users, create_user, get_user_by_id, get_user_by_username,
    update_password,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The username or password was left out of a registration or log-in request.
    #[error("Username and password are required")]
    MissingCredentials,

    /// The username does not belong to a registered user, or the password is wrong.
    ///
    /// Both cases share one message so that clients cannot probe for
    /// registered usernames.
    #[error("Incorrect username or password")]
    InvalidCredentials,

    /// The username has fewer than [Username::MIN_LENGTH] characters.
    #[error("Username must be at least {0} characters long")]
    UsernameTooShort(usize),

    /// The password has fewer than [ValidatedPassword::MIN_LENGTH] characters.
    #[error("Password must be at least {0} characters long")]
    PasswordTooShort(usize),

    /// The username is already taken by another user.
    #[error("Username already exists")]
    DuplicateUsername,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The request to a protected route did not carry a bearer token.
    #[error("Token required")]
    MissingToken,

    /// The bearer token is malformed, has a bad signature or has expired.
    #[error("Invalid token")]
    InvalidToken,

    /// The server could not sign a new token.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// A field needed to create a transaction was missing or blank.
    #[error("All fields are required")]
    MissingFields,

    /// A transaction amount was zero or negative.
    ///
    /// The sign of a transaction is given by its type, so amounts are always
    /// positive.
    #[error("Amount must be greater than 0")]
    NonPositiveAmount,

    /// The transaction type was neither "income" nor "expense".
    #[error("\"{0}\" is not a valid transaction type, expected \"income\" or \"expense\"")]
    InvalidTransactionType(String),

    /// The transaction date could not be parsed as a `YYYY-MM-DD` date.
    #[error("\"{0}\" is not a valid date, expected YYYY-MM-DD")]
    InvalidDate(String),

    /// The month filter could not be parsed as a `YYYY-MM` month.
    #[error("\"{0}\" is not a valid month, expected YYYY-MM")]
    InvalidMonth(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to delete a transaction that does not exist or belongs to
    /// another user.
    #[error("Transaction not found")]
    DeleteMissingTransaction,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.username") =>
            {
                Error::DuplicateUsername
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingCredentials
            | Error::InvalidCredentials
            | Error::UsernameTooShort(_)
            | Error::PasswordTooShort(_)
            | Error::DuplicateUsername
            | Error::MissingFields
            | Error::NonPositiveAmount
            | Error::InvalidTransactionType(_)
            | Error::InvalidDate(_)
            | Error::InvalidMonth(_) => StatusCode::BAD_REQUEST,
            Error::MissingToken | Error::InvalidToken => StatusCode::UNAUTHORIZED,
            Error::NotFound | Error::DeleteMissingTransaction => StatusCode::NOT_FOUND,
            Error::HashingError(_)
            | Error::TokenCreation(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::JSONSerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Internal errors are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "An internal error occurred. Please try again later.".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
