//! HTTP API.
//!
//! Thin translation layer: parses requests, calls into [`State`], and maps
//! [`CurrencyError`] to status codes. Currency codes are case-insensitive.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{self, Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use fxbook_common::CurrencyError;
use fxbook_ledger::BalanceSnapshot;

use crate::state::State;

/// Shared handler context.
#[derive(Clone)]
pub struct ApiContext {
    pub state: Arc<State>,
    /// Set to `true` to stop the service.
    pub shutdown: Arc<watch::Sender<bool>>,
}

/// Error returned by handlers.
#[derive(Debug)]
pub struct ApiError(CurrencyError);

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl From<CurrencyError> for ApiError {
    fn from(err: CurrencyError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_not_found() {
            StatusCode::NOT_FOUND
        } else if self.0.is_bad_request() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        if status.is_server_error() {
            warn!(error = %self.0, "Request failed");
        } else {
            info!(error = %self.0, "Request rejected");
        }

        let body = ErrorBody {
            code: self.0.error_code(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Balance of a single currency.
#[derive(Debug, Serialize, Deserialize)]
pub struct CurrencyBalance {
    pub name: String,
    pub value: Decimal,
}

/// Query string of `/convert`.
#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    pub from: String,
    pub to: String,
    pub amount: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversionResponse {
    pub from: String,
    pub to: String,
    pub amount: Decimal,
    pub result: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SkippedRate {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RatesUpdated {
    pub applied: usize,
    pub skipped: Vec<SkippedRate>,
}

/// Creates the API router.
pub fn create_router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/amount/get", get(get_report))
        .route("/amount/all", get(get_all_balances))
        .route("/amount/set", post(set_balances))
        .route("/modify", post(modify_balances))
        .route("/rates/set", post(set_rates))
        .route("/convert", get(convert))
        .route("/quit", post(quit))
        .route("/{id}/get", get(get_balance))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Upper-case and sort the codes of a request body.
///
/// Two keys naming the same currency (`usd` and `USD`) are rejected with
/// `InvalidAmount`.
fn normalize_codes(payload: HashMap<String, Decimal>) -> ApiResult<Vec<(String, Decimal)>> {
    let mut entries: Vec<(String, Decimal)> = payload
        .into_iter()
        .map(|(code, amount)| (code.to_uppercase(), amount))
        .collect();
    // Deterministic order so the first failing entry is stable
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    if let Some(pair) = entries.windows(2).find(|pair| pair[0].0 == pair[1].0) {
        return Err(CurrencyError::InvalidAmount {
            currency: pair[1].0.clone(),
            amount: pair[1].1,
        }
        .into());
    }
    Ok(entries)
}

async fn get_report(extract::State(ctx): extract::State<ApiContext>) -> String {
    let report = ctx.state.generate_report();
    for skipped in report.skipped() {
        warn!(
            error = %skipped,
            "Report term skipped, exchange rates may be incomplete"
        );
    }
    report.into_text()
}

async fn get_all_balances(
    extract::State(ctx): extract::State<ApiContext>,
) -> Json<BalanceSnapshot> {
    Json(ctx.state.get_all_balances())
}

async fn get_balance(
    extract::State(ctx): extract::State<ApiContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<CurrencyBalance>> {
    let name = id.to_uppercase();
    let value = ctx.state.get_balance(&name)?;
    Ok(Json(CurrencyBalance { name, value }))
}

async fn set_balances(
    extract::State(ctx): extract::State<ApiContext>,
    Json(payload): Json<HashMap<String, Decimal>>,
) -> ApiResult<StatusCode> {
    ctx.state.set_balances(normalize_codes(payload)?)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn modify_balances(
    extract::State(ctx): extract::State<ApiContext>,
    Json(payload): Json<HashMap<String, Decimal>>,
) -> ApiResult<StatusCode> {
    ctx.state.modify_balances(normalize_codes(payload)?)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_rates(
    extract::State(ctx): extract::State<ApiContext>,
    Json(payload): Json<HashMap<String, Decimal>>,
) -> ApiResult<Json<RatesUpdated>> {
    let entries = normalize_codes(payload)?;
    let skipped = ctx
        .state
        .set_exchange_rates(entries.iter().map(|(code, rate)| (code.as_str(), *rate)));

    Ok(Json(RatesUpdated {
        applied: entries.len() - skipped.len(),
        skipped: skipped
            .into_iter()
            .map(|e| SkippedRate {
                code: e.error_code().to_string(),
                message: e.to_string(),
            })
            .collect(),
    }))
}

async fn convert(
    extract::State(ctx): extract::State<ApiContext>,
    Query(query): Query<ConvertQuery>,
) -> ApiResult<Json<ConversionResponse>> {
    let from = query.from.to_uppercase();
    let to = query.to.to_uppercase();
    let result = ctx.state.convert(&from, query.amount, &to)?;

    Ok(Json(ConversionResponse {
        from,
        to,
        amount: query.amount,
        result,
    }))
}

async fn quit(extract::State(ctx): extract::State<ApiContext>) -> StatusCode {
    info!("Shutdown requested over HTTP");
    let _ = ctx.shutdown.send(true);
    StatusCode::ACCEPTED
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalize_codes_sorts_and_uppercases() {
        let payload = HashMap::from([("usd".to_string(), dec!(1)), ("Eur".to_string(), dec!(2))]);

        let entries = normalize_codes(payload).unwrap();

        assert_eq!(
            entries,
            vec![("EUR".to_string(), dec!(2)), ("USD".to_string(), dec!(1))]
        );
    }

    #[test]
    fn test_normalize_codes_rejects_case_duplicates() {
        let payload = HashMap::from([("usd".to_string(), dec!(1)), ("USD".to_string(), dec!(2))]);

        let err = normalize_codes(payload).unwrap_err();

        assert!(matches!(err.0, CurrencyError::InvalidAmount { ref currency, .. } if currency == "USD"));
    }
}
