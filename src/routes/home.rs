use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub async fn index() -> Json<serde_json::Value> {
    Json(json!({ "success": true, "post": "Welcome to the Reddit Server" }))
}

/// Fallback for every unmatched route.
pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "error": "Route does not exist" })),
    )
        .into_response()
}
