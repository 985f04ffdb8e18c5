//! Defines the endpoint for creating a new transaction.

use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::Deserialize;
use time::{Date, macros::format_description};

use crate::{
    Error,
    transaction::{Transaction, TransactionState, TransactionType, core::create_transaction},
    user::UserID,
};

/// The amount as sent by the client, either a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    /// e.g. `12.5`
    Number(f64),
    /// e.g. `"12.5"`
    Text(String),
}

impl RawAmount {
    fn parse(&self) -> Result<f64, Error> {
        match self {
            RawAmount::Number(amount) => Ok(*amount),
            RawAmount::Text(text) => text.trim().parse().map_err(|_| Error::NonPositiveAmount),
        }
    }
}

/// The request body for creating a transaction.
///
/// Every field is optional so that missing fields are reported with
/// [Error::MissingFields] rather than a deserialization error.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TransactionForm {
    /// Text detailing the transaction.
    #[serde(default)]
    pub description: Option<String>,
    /// The value of the transaction, must be greater than zero.
    #[serde(default)]
    pub amount: Option<RawAmount>,
    /// Either "income" or "expense".
    #[serde(default, rename = "type")]
    pub transaction_type: Option<String>,
    /// The category of the transaction.
    #[serde(default)]
    pub category: Option<String>,
    /// The date when the transaction occurred, formatted as `YYYY-MM-DD`.
    #[serde(default)]
    pub date: Option<String>,
}

fn non_blank(field: &Option<String>) -> Result<&str, Error> {
    match field.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::MissingFields),
    }
}

fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .map_err(|_| Error::InvalidDate(text.to_owned()))
}

/// A route handler for creating a new transaction, responds with the stored
/// transaction and the status code 201.
///
/// # Errors
///
/// Returns an error if a field is missing or blank, the amount is not greater
/// than zero, the type or date is invalid, or the transaction could not be saved.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Json(form): Json<TransactionForm>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let description = non_blank(&form.description)?;
    let transaction_type = non_blank(&form.transaction_type)?;
    let category = non_blank(&form.category)?;
    let date = non_blank(&form.date)?;
    let amount = form.amount.as_ref().ok_or(Error::MissingFields)?.parse()?;

    let transaction_type: TransactionType = transaction_type.parse()?;
    let date = parse_date(date)?;

    let new_transaction =
        Transaction::build(amount, transaction_type, category, date).description(description);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = create_transaction(user_id, new_transaction, &connection)
        .inspect_err(|error| tracing::debug!("could not create transaction: {error}"))?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use time::macros::date;

    use crate::{
        endpoints,
        test_utils::{create_test_user_with_token, get_test_state, new_test_server},
        transaction::{Transaction, TransactionType, get_transaction},
    };

    fn valid_body() -> serde_json::Value {
        json!({
            "description": "Groceries",
            "amount": 42.5,
            "type": "expense",
            "category": "Food",
            "date": "2024-03-05",
        })
    }

    #[tokio::test]
    async fn creates_transaction() {
        let state = get_test_state();
        let (user, token) = create_test_user_with_token("ana", &state);
        let server = new_test_server(state.clone());

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .authorization_bearer(token)
            .json(&valid_body())
            .await;

        response.assert_status(StatusCode::CREATED);
        let transaction = response.json::<Transaction>();
        assert_eq!(transaction.user_id, user.id);
        assert_eq!(transaction.description, "Groceries");
        assert_eq!(transaction.amount, 42.5);
        assert_eq!(transaction.transaction_type, TransactionType::Expense);
        assert_eq!(transaction.category, "Food");
        assert_eq!(transaction.date, date!(2024 - 03 - 05));

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_transaction(transaction.id, user.id, &connection),
            Ok(transaction)
        );
    }

    #[tokio::test]
    async fn responds_with_plain_json_fields() {
        let state = get_test_state();
        let (_, token) = create_test_user_with_token("ana", &state);
        let server = new_test_server(state);

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .authorization_bearer(token)
            .json(&valid_body())
            .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["date"], "2024-03-05");
        assert_eq!(body["type"], "expense");
        assert_eq!(body["amount"], 42.5);
        assert_eq!(body["category"], "Food");
        assert!(body["id"].is_i64());
        assert!(body["created_at"].is_string());
    }

    #[tokio::test]
    async fn accepts_amount_as_string() {
        let state = get_test_state();
        let (_, token) = create_test_user_with_token("ana", &state);
        let server = new_test_server(state);
        let mut body = valid_body();
        body["amount"] = json!("1200.75");
        body["type"] = json!("income");

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .authorization_bearer(token)
            .json(&body)
            .await;

        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.json::<Transaction>().amount, 1200.75);
    }

    #[tokio::test]
    async fn rejects_missing_fields() {
        let state = get_test_state();
        let (_, token) = create_test_user_with_token("ana", &state);
        let server = new_test_server(state);

        for field in ["description", "amount", "type", "category", "date"] {
            let mut body = valid_body();
            body.as_object_mut().unwrap().remove(field);

            let response = server
                .post(endpoints::TRANSACTIONS_API)
                .authorization_bearer(token.clone())
                .json(&body)
                .await;

            response.assert_status(StatusCode::BAD_REQUEST);
            response.assert_json(&json!({ "error": "All fields are required" }));
        }
    }

    #[tokio::test]
    async fn rejects_blank_description() {
        let state = get_test_state();
        let (_, token) = create_test_user_with_token("ana", &state);
        let server = new_test_server(state);
        let mut body = valid_body();
        body["description"] = json!("   ");

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .authorization_bearer(token)
            .json(&body)
            .await;

        response.assert_json(&json!({ "error": "All fields are required" }));
    }

    #[tokio::test]
    async fn rejects_non_positive_amount() {
        let state = get_test_state();
        let (_, token) = create_test_user_with_token("ana", &state);
        let server = new_test_server(state);

        for amount in [
            json!(0),
            json!(-5.0),
            json!("-1"),
            json!("inf"),
            json!("infinity"),
            json!("1e999"),
        ] {
            let mut body = valid_body();
            body["amount"] = amount;

            let response = server
                .post(endpoints::TRANSACTIONS_API)
                .authorization_bearer(token.clone())
                .json(&body)
                .await;

            response.assert_status(StatusCode::BAD_REQUEST);
            response.assert_json(&json!({ "error": "Amount must be greater than 0" }));
        }
    }

    #[tokio::test]
    async fn rejects_unknown_type_and_bad_date() {
        let state = get_test_state();
        let (_, token) = create_test_user_with_token("ana", &state);
        let server = new_test_server(state);

        let mut bad_type = valid_body();
        bad_type["type"] = json!("transfer");
        let mut bad_date = valid_body();
        bad_date["date"] = json!("05/03/2024");

        for body in [bad_type, bad_date] {
            server
                .post(endpoints::TRANSACTIONS_API)
                .authorization_bearer(token.clone())
                .json(&body)
                .await
                .assert_status(StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn requires_token() {
        let server = new_test_server(get_test_state());

        server
            .post(endpoints::TRANSACTIONS_API)
            .json(&valid_body())
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
