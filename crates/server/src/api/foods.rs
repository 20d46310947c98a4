//! One-shot food search and barcode lookup handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use nutrisearch_core::{normalize_barcode, BarcodeOutcome, FoodItem, SearchOutcome};

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/foods/search?q=&limit=
///
/// Orchestrated text search. An empty `q` yields an empty outcome.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<SearchOutcome> {
    let mut outcome = state.search().search(&params.q).await;
    if let Some(limit) = params.limit {
        outcome.items.truncate(limit.min(state.max_results()));
    }
    Json(outcome)
}

/// GET /api/v1/foods/barcode/{code}
///
/// 200 with the product, 404 when the provider does not know the code,
/// 400 for a malformed code, 503 when the lookup could not be completed.
pub async fn lookup_barcode(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<FoodItem>, ApiError> {
    let Some(code) = normalize_barcode(&code) else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("Invalid barcode '{}': expected 8 to 14 digits", code.trim()),
        ));
    };

    let outcome = state.search().lookup_barcode(code).await;
    debug!(code = %code, outcome = outcome.label(), "Barcode lookup handled");

    match outcome {
        BarcodeOutcome::Found { item } => Ok(Json(item)),
        BarcodeOutcome::NotFound => Err(api_error(
            StatusCode::NOT_FOUND,
            format!("No product found for barcode {}", code),
        )),
        BarcodeOutcome::Unavailable { reason } => {
            Err(api_error(StatusCode::SERVICE_UNAVAILABLE, reason))
        }
    }
}
