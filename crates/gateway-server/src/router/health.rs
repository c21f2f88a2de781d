use axum::{response::IntoResponse, Json};

pub(super) async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}
