//! HTTP handlers for the summary endpoints.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    month::parse_optional_month,
    summary::{
        aggregation::{MonthlyTotal, Summary, get_monthly_totals, get_summary},
        charts::{SummaryChart, build_summary_charts},
    },
    user::UserID,
};

/// The state needed for the summary endpoints.
#[derive(Debug, Clone)]
pub struct SummaryState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

impl SummaryState {
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
    }
}

/// The query parameters for the summary endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    /// Restrict the summary to this month, formatted as `YYYY-MM`.
    pub month: Option<String>,
}

/// The response body of the charts endpoint.
#[derive(Debug, Serialize)]
pub struct ChartsResponse {
    /// The charts that have data to show.
    pub charts: Vec<SummaryChart>,
}

/// Get the income and expense totals, balance and category breakdown.
///
/// # Errors
/// Returns [Error::InvalidMonth] if the month is not formatted as `YYYY-MM`.
pub async fn get_summary_endpoint(
    State(state): State<SummaryState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<Summary>, Error> {
    let month = parse_optional_month(query.month.as_deref())?;
    let connection = state.lock()?;

    get_summary(user_id, month, &connection).map(Json)
}

/// Get the income, expense and net totals for every month with transactions.
pub async fn get_monthly_summary_endpoint(
    State(state): State<SummaryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<MonthlyTotal>>, Error> {
    let connection = state.lock()?;

    get_monthly_totals(user_id, &connection).map(Json)
}

/// Get the ECharts options for the summary charts.
///
/// # Errors
/// Returns [Error::InvalidMonth] if the month is not formatted as `YYYY-MM`.
pub async fn get_summary_charts_endpoint(
    State(state): State<SummaryState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<ChartsResponse>, Error> {
    let month = parse_optional_month(query.month.as_deref())?;

    let (summary, monthly) = {
        let connection = state.lock()?;
        (
            get_summary(user_id, month, &connection)?,
            get_monthly_totals(user_id, &connection)?,
        )
    };

    let charts = build_summary_charts(&summary, &monthly)
        .inspect_err(|error| tracing::error!("could not build summary charts: {error}"))?;

    Ok(Json(ChartsResponse { charts }))
}
