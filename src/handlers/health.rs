use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use tracing::info;

use crate::error::AppResult;
use crate::services::PdfExtractor;
use crate::state::AppState;

/// Health check endpoint
pub async fn health_handler(State(state): State<AppState>) -> AppResult<Json<Value>> {
    info!("Health check requested");

    let pdf_extractor = PdfExtractor::default().is_available();
    let status = if pdf_extractor { "healthy" } else { "degraded" };

    let response = json!({
        "status": status,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "pdf_extractor": pdf_extractor,
            "completion_model": state.config.llm_model,
        }
    });

    Ok(Json(response))
}

/// Readiness check endpoint (for Kubernetes/Railway)
pub async fn ready_handler() -> Result<StatusCode, StatusCode> {
    if PdfExtractor::default().is_available() {
        Ok(StatusCode::OK)
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}
