use axum::extract::State;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::extractors::{Caller, JsonBody, PathParam};
use crate::state::AppState;

#[derive(Deserialize, Default)]
pub struct CreateSubredditRequest {
    pub name: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/subreddits", get(list_subreddits).post(create_subreddit))
        .route("/subreddits/{subreddit_id}", delete(delete_subreddit))
}

async fn list_subreddits(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let subreddits = state.communities.list().await?;
    Ok(Json(json!({ "success": true, "subreddits": subreddits })))
}

async fn create_subreddit(
    State(state): State<AppState>,
    Caller(caller): Caller,
    JsonBody(req): JsonBody<CreateSubredditRequest>,
) -> AppResult<Json<Value>> {
    let subreddit = state
        .communities
        .create(req.name.as_deref(), &caller)
        .await?;
    Ok(Json(json!({ "success": true, "subreddit": subreddit })))
}

async fn delete_subreddit(
    State(state): State<AppState>,
    PathParam(subreddit_id): PathParam<String>,
) -> AppResult<Json<Value>> {
    let subreddit = state.communities.delete(&subreddit_id).await?;
    Ok(Json(json!({ "success": true, "subreddit": subreddit })))
}
