//! The endpoint for logging in with a username and password.

use axum::{Json, extract::State};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::{AuthState, Credentials, TokenResponse, encode_token},
    user::{User, Username, get_user_by_username},
};

/// Handler for log-in requests.
///
/// On success the response carries a fresh bearer token for the user.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The username or password is missing.
/// - The username is unknown or the password is not correct. Both cases
///   give the same error.
/// - An internal error occurred when verifying the password.
pub async fn log_in(
    State(state): State<AuthState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<TokenResponse>, Error> {
    let (raw_username, raw_password) = credentials.require()?;

    // A name that could never have been registered cannot match anyone.
    let username = Username::new(raw_username).map_err(|_| Error::InvalidCredentials)?;

    let user: User = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        match get_user_by_username(&username, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => return Err(Error::InvalidCredentials),
            Err(error) => return Err(error),
        }
    };

    let is_password_valid = user.password_hash.verify(raw_password).map_err(|error| {
        tracing::error!("Unhandled error while verifying credentials: {error}");
        Error::HashingError(error.to_string())
    })?;

    if !is_password_valid {
        tracing::debug!("rejected log-in attempt for {}", user.username);
        return Err(Error::InvalidCredentials);
    }

    let token = encode_token(
        &user,
        OffsetDateTime::now_utc(),
        state.token_duration,
        &state.token_keys,
    )?;

    Ok(Json(TokenResponse {
        token,
        username: user.username.to_string(),
    }))
}
