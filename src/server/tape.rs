//! Tape discovery endpoints backed by the record source:
//! GET /dates, GET /stocks/:date, GET /data/:date/:stock

use crate::server::AppState;
use crate::utils::{format_date, parse_date};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, instrument, warn};

fn bad_request(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({
            "success": false,
            "error": message,
        })),
    )
        .into_response()
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({
            "success": false,
            "error": "Internal error",
        })),
    )
        .into_response()
}

/// GET /dates - trading dates with tape data available
#[instrument(skip(app_state))]
pub async fn list_dates_handler(State(app_state): State<AppState>) -> Response {
    match app_state.source.list_dates().await {
        Ok(dates) => {
            let dates: Vec<String> = dates.into_iter().map(format_date).collect();
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "success": true,
                    "data": { "dates": dates },
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list tape dates");
            internal_error()
        }
    }
}

/// GET /stocks/:date - stock codes with tape data on a date
#[instrument(skip(app_state))]
pub async fn list_stocks_handler(
    State(app_state): State<AppState>,
    Path(date): Path<String>,
) -> Response {
    let date = match parse_date(&date) {
        Ok(date) => date,
        Err(e) => {
            warn!(error = %e, "Rejected stocks request");
            return bad_request(e.to_string());
        }
    };

    match app_state.source.list_stocks(date).await {
        Ok(stocks) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "data": { "date": format_date(date), "stocks": stocks },
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, date = %format_date(date), "Failed to list stocks");
            internal_error()
        }
    }
}

/// GET /data/:date/:stock - raw done-trade records for one stock/date
#[instrument(skip(app_state))]
pub async fn get_data_handler(
    State(app_state): State<AppState>,
    Path((date, stock)): Path<(String, String)>,
) -> Response {
    let date = match parse_date(&date) {
        Ok(date) => date,
        Err(e) => {
            warn!(error = %e, "Rejected data request");
            return bad_request(e.to_string());
        }
    };

    match app_state.source.fetch(&stock, date).await {
        Ok(records) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "data": {
                    "date": format_date(date),
                    "stockCode": stock.to_uppercase(),
                    "records": records,
                },
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, stock = %stock, date = %format_date(date), "Failed to read tape");
            internal_error()
        }
    }
}
