//! Authentication middleware that validates bearer tokens.

use axum::{
    RequestPartsExt,
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{
    Error,
    auth::{TokenKeys, decode_token},
};

/// Middleware function that checks for a valid bearer token.
///
/// The user ID from the token is placed into the request and the request is
/// executed normally if the token is valid, otherwise a 401 response is
/// returned.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard(State(keys): State<TokenKeys>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    if !parts.headers.contains_key(AUTHORIZATION) {
        return Error::MissingToken.into_response();
    }

    let bearer = match parts.extract::<TypedHeader<Authorization<Bearer>>>().await {
        Ok(TypedHeader(Authorization(bearer))) => bearer,
        Err(error) => {
            tracing::debug!("could not parse authorization header: {error}");
            return Error::InvalidToken.into_response();
        }
    };

    let claims = match decode_token(bearer.token(), &keys) {
        Ok(claims) => claims,
        Err(error) => return error.into_response(),
    };

    parts.extensions.insert(claims.user_id);
    let request = Request::from_parts(parts, body);

    next.run(request).await
}

#[cfg(test)]
mod auth_guard_tests {
    use axum::{Extension, Router, http::StatusCode, middleware, routing::get};
    use axum_test::TestServer;
    use time::{Duration, OffsetDateTime};

    use crate::{
        PasswordHash,
        auth::{TokenKeys, auth_guard, encode_token},
        user::{User, UserID, Username},
    };

    const TEST_PROTECTED_ROUTE: &str = "/protected";

    async fn test_handler(Extension(user_id): Extension<UserID>) -> String {
        user_id.to_string()
    }

    fn get_test_server(keys: TokenKeys) -> TestServer {
        let app = Router::new()
            .route(TEST_PROTECTED_ROUTE, get(test_handler))
            .layer(middleware::from_fn_with_state(keys.clone(), auth_guard))
            .with_state(keys);

        TestServer::new(app)
    }

    fn test_token(keys: &TokenKeys, issued_at: OffsetDateTime) -> String {
        let user = User {
            id: UserID::new(42),
            username: Username::new("ana").unwrap(),
            password_hash: PasswordHash::new_unchecked("hunter2"),
        };

        encode_token(&user, issued_at, Duration::days(7), keys).unwrap()
    }

    #[tokio::test]
    async fn get_protected_route_with_valid_token() {
        let keys = TokenKeys::from_secret("nafstenoas");
        let server = get_test_server(keys.clone());
        let token = test_token(&keys, OffsetDateTime::now_utc());

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .authorization_bearer(token)
            .await;

        response.assert_status_ok();
        response.assert_text("42");
    }

    #[tokio::test]
    async fn get_protected_route_with_missing_header() {
        let server = get_test_server(TokenKeys::from_secret("nafstenoas"));

        let response = server.get(TEST_PROTECTED_ROUTE).await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&serde_json::json!({ "error": "Token required" }));
    }

    #[tokio::test]
    async fn get_protected_route_with_empty_token() {
        let server = get_test_server(TokenKeys::from_secret("nafstenoas"));

        server
            .get(TEST_PROTECTED_ROUTE)
            .authorization_bearer("")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn get_protected_route_with_token_from_other_secret() {
        let server = get_test_server(TokenKeys::from_secret("nafstenoas"));
        let token = test_token(
            &TokenKeys::from_secret("a different secret"),
            OffsetDateTime::now_utc(),
        );

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .authorization_bearer(token)
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&serde_json::json!({ "error": "Invalid token" }));
    }

    #[tokio::test]
    async fn get_protected_route_with_expired_token() {
        let keys = TokenKeys::from_secret("nafstenoas");
        let server = get_test_server(keys.clone());
        let token = test_token(&keys, OffsetDateTime::now_utc() - Duration::days(30));

        server
            .get(TEST_PROTECTED_ROUTE)
            .authorization_bearer(token)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
