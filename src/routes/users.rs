use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::extractors::{Caller, JsonBody};
use crate::state::AppState;

#[derive(Deserialize, Default)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/login", post(login))
        .route("/users/register", post(register))
        .route("/users/token", get(current_user))
}

async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CredentialsRequest>,
) -> AppResult<Json<Value>> {
    let token = state.credentials.login(&req.username, &req.password).await?;
    Ok(Json(json!({ "success": true, "token": token })))
}

async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CredentialsRequest>,
) -> AppResult<Json<Value>> {
    let token = state
        .credentials
        .register(&req.username, &req.password)
        .await?;
    Ok(Json(json!({ "success": true, "token": token })))
}

/// GET /users/token: the caller's profile, resolved from the bearer token
async fn current_user(Caller(caller): Caller) -> AppResult<Json<Value>> {
    let user = caller.require()?;
    Ok(Json(json!({ "success": true, "user": user })))
}
