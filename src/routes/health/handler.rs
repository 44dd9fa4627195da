use axum::Json;

use crate::utils::now_iso;

use super::model::HealthResponse;

// 部署探活用，永远 200
#[axum::debug_handler]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: now_iso(),
    })
}
