//! POST /pivot - the transaction pivot aggregation endpoint.

use crate::constants::MAX_REQUEST_DATES;
use crate::engine::{paginate, sort_row_keys, Filters, Pagination, SortOrder};
use crate::error::AppError;
use crate::models::{PivotResult, PivotType};
use crate::server::AppState;
use crate::utils::parse_date;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

/// Request body for POST /pivot
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotRequest {
    pub stock_code: String,

    /// Trading dates (YYYY-MM-DD), 1..=7 entries
    pub dates: Vec<String>,

    /// One of the recognized pivot type strings, case-sensitive
    pub pivot_type: String,

    // Optional pre-aggregation filters
    pub stock_codes: Option<Vec<String>>,
    pub buyer_brokers: Option<Vec<String>>,
    pub seller_brokers: Option<Vec<String>>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,

    // Post-aggregation pagination/sorting
    pub page: Option<usize>,
    pub page_size: Option<usize>,

    /// Row ordering for time-like dimensions: "latest" or "oldest"
    pub sort: Option<String>,
}

/// Successful response payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotResponseData {
    pub stock_code: String,
    /// Requested dates in request order; a date with no trades appears here
    /// even though no row carries cells for it
    pub dates: Vec<String>,
    pub pivot_type: PivotType,
    pub pivot_data: PivotResult,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct PivotResponse {
    pub success: bool,
    pub data: PivotResponseData,
}

/// Validated form of a pivot request, ready for the engine
#[derive(Debug)]
struct ValidatedRequest {
    stock_code: String,
    dates: Vec<NaiveDate>,
    pivot_type: PivotType,
    filters: Filters,
    sort: Option<SortOrder>,
}

fn validate_request(request: &PivotRequest) -> Result<ValidatedRequest, String> {
    let stock_code = request.stock_code.trim().to_uppercase();
    if stock_code.is_empty() {
        return Err("stockCode is required".to_string());
    }

    if request.dates.is_empty() {
        return Err("dates must contain at least one entry".to_string());
    }
    if request.dates.len() > MAX_REQUEST_DATES {
        return Err(format!(
            "dates must contain at most {} entries",
            MAX_REQUEST_DATES
        ));
    }
    let dates = request
        .dates
        .iter()
        .map(|d| parse_date(d))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;

    let pivot_type = PivotType::from_str(&request.pivot_type).map_err(|e| e.to_string())?;

    let sort = match request.sort.as_deref() {
        None => None,
        Some("latest") => Some(SortOrder::Latest),
        Some("oldest") => Some(SortOrder::Oldest),
        Some(other) => {
            return Err(format!(
                "Invalid sort '{}'. Valid values: latest, oldest",
                other
            ))
        }
    };

    Ok(ValidatedRequest {
        stock_code,
        dates,
        pivot_type,
        filters: Filters {
            stock_codes: request.stock_codes.clone(),
            buyer_brokers: request.buyer_brokers.clone(),
            seller_brokers: request.seller_brokers.clone(),
            min_price: request.min_price,
            max_price: request.max_price,
        },
        sort,
    })
}

fn client_error(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(serde_json::json!({
            "success": false,
            "error": message,
        })),
    )
        .into_response()
}

/// POST /pivot - aggregate done-trade records into a pivot table
#[instrument(skip(app_state, request))]
pub async fn pivot_handler(
    State(app_state): State<AppState>,
    Json(request): Json<PivotRequest>,
) -> Response {
    debug!(
        stock = %request.stock_code,
        pivot_type = %request.pivot_type,
        dates = request.dates.len(),
        "Received pivot request"
    );

    let validated = match validate_request(&request) {
        Ok(validated) => validated,
        Err(message) => {
            warn!(error = %message, "Rejected pivot request");
            return client_error(message);
        }
    };

    let result = match app_state
        .engine
        .pivot(
            &validated.stock_code,
            &validated.dates,
            validated.pivot_type,
            validated.filters,
        )
        .await
    {
        Ok(result) => result,
        Err(AppError::InvalidInput(message)) => return client_error(message),
        Err(e) => {
            // Full context in the log, generic failure to the client
            error!(
                stock = %validated.stock_code,
                dates = ?request.dates,
                pivot_type = %validated.pivot_type,
                error = %e,
                "Pivot aggregation failed"
            );
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(serde_json::json!({
                    "success": false,
                    "error": "Internal error",
                })),
            )
                .into_response();
        }
    };

    // Pagination operates on sorted row keys of the immutable result
    let sorted_keys = sort_row_keys(result.row_keys(), validated.sort);
    let page = paginate(&sorted_keys, request.page, request.page_size);
    let pivot_data = result.subset(&page.keys);

    info!(
        stock = %validated.stock_code,
        pivot_type = %validated.pivot_type,
        total_rows = page.pagination.total_rows,
        page = page.pagination.page,
        "Returning pivot data"
    );

    (
        StatusCode::OK,
        axum::Json(PivotResponse {
            success: true,
            data: PivotResponseData {
                stock_code: validated.stock_code,
                dates: request.dates,
                pivot_type: validated.pivot_type,
                pivot_data,
                pagination: page.pagination,
            },
        }),
    )
        .into_response()
}
