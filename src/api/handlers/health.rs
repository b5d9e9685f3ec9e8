use axum::response::IntoResponse;
use serde_json::json;

use crate::utils::success_to_api_response;

/// 健康检查
pub async fn health() -> impl IntoResponse {
    success_to_api_response(json!({ "status": "ok" }))
}
