use axum::Json;

use crate::app::dto::HealthResponse;

/// GET /health - liveness probe
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
