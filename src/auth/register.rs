//! The endpoint for registering a new user.

use axum::{Json, extract::State, http::StatusCode};
use time::OffsetDateTime;

use crate::{
    Error, PasswordHash, ValidatedPassword,
    auth::{AuthState, Credentials, TokenResponse, encode_token},
    user::{Username, create_user, get_user_by_username},
};

/// Handler for registration requests.
///
/// On success the new user is logged in straight away: the response carries
/// a bearer token and the status code 201.
///
/// # Errors
///
/// This function will return an error if:
/// - the username or password is missing,
/// - the username or password is too short,
/// - the username is already taken,
/// - or an internal error occurred while hashing the password or signing the token.
pub async fn register_user(
    State(state): State<AuthState>,
    Json(credentials): Json<Credentials>,
) -> Result<(StatusCode, Json<TokenResponse>), Error> {
    let (raw_username, raw_password) = credentials.require()?;
    let username = Username::new(raw_username)?;
    let validated_password = ValidatedPassword::new(raw_password)?;

    {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        match get_user_by_username(&username, &connection) {
            Ok(_) => return Err(Error::DuplicateUsername),
            Err(Error::NotFound) => {}
            Err(error) => return Err(error),
        }
    }

    let password_hash = PasswordHash::new(validated_password, state.password_hash_cost)
        .inspect_err(|error| tracing::error!("an error occurred while hashing a password: {error}"))?;

    let user = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        create_user(username, password_hash, &connection)?
    };

    tracing::info!("registered new user {} with ID {}", user.username, user.id);

    let token = encode_token(
        &user,
        OffsetDateTime::now_utc(),
        state.token_duration,
        &state.token_keys,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            token,
            username: user.username.to_string(),
        }),
    ))
}

#[cfg(test)]
mod register_tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        auth::{TokenResponse, decode_token},
        endpoints,
        test_utils::{get_test_state, new_test_server},
    };

    #[tokio::test]
    async fn register_returns_token_for_new_user() {
        let state = get_test_state();
        let server = new_test_server(state.clone());

        let response = server
            .post(endpoints::REGISTER_API)
            .json(&json!({ "username": "ana", "password": "hunter22" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<TokenResponse>();
        assert_eq!(body.username, "ana");

        let claims = decode_token(&body.token, &state.token_keys).unwrap();
        assert_eq!(claims.username.as_ref(), "ana");
    }

    #[tokio::test]
    async fn register_trims_username() {
        let server = new_test_server(get_test_state());

        let response = server
            .post(endpoints::REGISTER_API)
            .json(&json!({ "username": "  ana ", "password": "hunter22" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["username"], "ana");
        assert!(body["token"].is_string());
    }

    #[tokio::test]
    async fn register_fails_on_missing_password() {
        let server = new_test_server(get_test_state());

        let response = server
            .post(endpoints::REGISTER_API)
            .json(&json!({ "username": "ana" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "Username and password are required" }));
    }

    #[tokio::test]
    async fn register_fails_on_short_username() {
        let server = new_test_server(get_test_state());

        let response = server
            .post(endpoints::REGISTER_API)
            .json(&json!({ "username": "an", "password": "hunter22" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "Username must be at least 3 characters long" }));
    }

    #[tokio::test]
    async fn register_fails_on_short_password() {
        let server = new_test_server(get_test_state());

        let response = server
            .post(endpoints::REGISTER_API)
            .json(&json!({ "username": "ana", "password": "12345" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "Password must be at least 6 characters long" }));
    }

    #[tokio::test]
    async fn register_fails_on_duplicate_username() {
        let server = new_test_server(get_test_state());

        server
            .post(endpoints::REGISTER_API)
            .json(&json!({ "username": "ana", "password": "hunter22" }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post(endpoints::REGISTER_API)
            .json(&json!({ "username": "ana", "password": "another password" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "Username already exists" }));
    }
}
