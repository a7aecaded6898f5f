use axum::{Json, body::Bytes, extract::State};
use std::sync::Arc;

use crate::AppState;
use crate::models::{AnalysisRequest, AnalysisResponse};
use crate::utils::{ApiError, ApiResult};

pub const LIVENESS_MESSAGE: &str = "Market analyzer is running";

// Analyze the market potential of a product in a destination country
#[utoipa::path(
    post,
    path = "/analyze",
    request_body = AnalysisRequest,
    responses(
        (status = 200, description = "Keywords, platforms and strategy", body = AnalysisResponse),
        (status = 400, description = "Missing or oversized product/country"),
        (status = 500, description = "Missing API key or unexpected failure"),
        (status = 502, description = "Gemini API error or no usable model")
    ),
    tag = "Analysis"
)]
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<AnalysisResponse>> {
    let req = AnalysisRequest::from_body(&body).map_err(|e| {
        tracing::debug!("Rejected analysis request: {}", e);
        e
    })?;

    tracing::info!("Analyzing '{}' for '{}'", req.product, req.country);
    let response = state.analysis_service.analyze(&req).await?;

    Ok(Json(response))
}

// Liveness probe
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service is up", body = String)),
    tag = "Health"
)]
pub async fn health() -> &'static str {
    LIVENESS_MESSAGE
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
