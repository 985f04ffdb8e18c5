//! Registration, log-in and bearer token authentication.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{AppState, Error};

mod log_in;
mod middleware;
mod register;
mod token;

pub use log_in::log_in;
pub use middleware::auth_guard;
pub use register::register_user;
pub use token::{Claims, TokenKeys, decode_token, encode_token};

/// The state needed for registering and logging in users.
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The keys used to sign bearer tokens.
    pub token_keys: TokenKeys,
    /// The duration for which newly issued tokens are valid.
    pub token_duration: Duration,
    /// The bcrypt cost used when hashing new passwords.
    pub password_hash_cost: u32,
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            token_keys: state.token_keys.clone(),
            token_duration: state.token_duration,
            password_hash_cost: state.password_hash_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The username and password sent by the client to register or log in.
///
/// Both fields are optional so that missing fields are reported with
/// [Error::MissingCredentials] rather than a deserialization error.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// The name the user logs in with.
    #[serde(default)]
    pub username: Option<String>,
    /// The user's password in plain text.
    #[serde(default)]
    pub password: Option<String>,
}

impl Credentials {
    /// Get the username and password, or an error if either is missing or blank.
    fn require(&self) -> Result<(&str, &str), Error> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(username), Some(password))
                if !username.trim().is_empty() && !password.is_empty() =>
            {
                Ok((username, password))
            }
            _ => Err(Error::MissingCredentials),
        }
    }
}

/// The response body for a successful registration or log-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The bearer token to send in the `Authorization` header.
    pub token: String,
    /// The name of the authenticated user.
    pub username: String,
}

#[cfg(test)]
mod credentials_tests {
    use crate::Error;

    use super::Credentials;

    #[test]
    fn require_fails_on_missing_fields() {
        let credentials = Credentials {
            username: Some("ana".to_owned()),
            password: None,
        };

        assert_eq!(credentials.require(), Err(Error::MissingCredentials));
        assert_eq!(
            Credentials::default().require(),
            Err(Error::MissingCredentials)
        );
    }

    #[test]
    fn require_fails_on_blank_fields() {
        let credentials = Credentials {
            username: Some("   ".to_owned()),
            password: Some("hunter22".to_owned()),
        };

        assert_eq!(credentials.require(), Err(Error::MissingCredentials));
    }

    #[test]
    fn require_returns_fields() {
        let credentials = Credentials {
            username: Some("ana".to_owned()),
            password: Some("hunter22".to_owned()),
        };

        assert_eq!(credentials.require(), Ok(("ana", "hunter22")));
    }
}
