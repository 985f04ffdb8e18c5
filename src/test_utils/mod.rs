#![allow(missing_docs)]

pub(crate) mod http;

pub(crate) use http::new_test_server;

use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, PasswordHash,
    auth::encode_token,
    db::initialize,
    user::{User, Username, create_user},
};

/// The plain text password of every user made by [create_test_user].
pub(crate) const TEST_PASSWORD: &str = "averysafeandsecurepassword";

/// The secret used to sign bearer tokens in tests.
pub(crate) const TEST_SECRET: &str = "nafstenoas";

/// The lowest cost bcrypt accepts, so hashing in tests stays quick.
pub(crate) const TEST_HASH_COST: u32 = 4;

pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().unwrap();
    initialize(&connection).unwrap();
    connection
}

pub(crate) fn get_test_state() -> AppState {
    let connection = Connection::open_in_memory().unwrap();

    AppState::new(connection, TEST_SECRET)
        .unwrap()
        .with_password_hash_cost(TEST_HASH_COST)
}

#[track_caller]
pub(crate) fn create_test_user(name: &str, connection: &Connection) -> User {
    let password_hash = PasswordHash::from_raw_password(TEST_PASSWORD, TEST_HASH_COST).unwrap();

    create_user(Username::new(name).unwrap(), password_hash, connection).unwrap()
}

/// Create a user in the state's database and a valid bearer token for them.
#[track_caller]
pub(crate) fn create_test_user_with_token(name: &str, state: &AppState) -> (User, String) {
    let user = {
        let connection = state.db_connection.lock().unwrap();
        create_test_user(name, &connection)
    };

    let token = encode_token(
        &user,
        OffsetDateTime::now_utc(),
        state.token_duration,
        &state.token_keys,
    )
    .unwrap();

    (user, token)
}
