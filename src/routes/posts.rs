use axum::extract::State;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::extractors::{Caller, JsonBody, PathParam, QueryParams};
use crate::forum::PostDraft;
use crate::state::AppState;

// --- Request types ---

#[derive(Deserialize, Default)]
pub struct ListPostsQuery {
    /// Defaults to the expanded tree listing
    pub tree: Option<bool>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub text: Option<String>,
    pub subreddit_id: Option<String>,
    pub parent_id: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub text: Option<String>,
}

// --- Router ---

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{post_id}", put(update_post).delete(delete_post))
}

// --- Handlers ---

async fn list_posts(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListPostsQuery>,
) -> AppResult<Json<Value>> {
    let posts = state.posts.list_all(query.tree.unwrap_or(true)).await?;
    Ok(Json(json!({ "success": true, "posts": posts })))
}

async fn create_post(
    State(state): State<AppState>,
    Caller(caller): Caller,
    JsonBody(req): JsonBody<CreatePostRequest>,
) -> AppResult<Json<Value>> {
    let draft = PostDraft {
        title: req.title,
        text: req.text,
        subreddit_id: req.subreddit_id,
        parent_id: req.parent_id,
    };
    let post = state.posts.create(draft, &caller).await?;
    Ok(Json(json!({ "success": true, "post": post })))
}

async fn update_post(
    State(state): State<AppState>,
    Caller(caller): Caller,
    PathParam(post_id): PathParam<String>,
    JsonBody(req): JsonBody<UpdatePostRequest>,
) -> AppResult<Json<Value>> {
    let post = state
        .posts
        .update(
            &post_id,
            req.title.as_deref(),
            req.text.as_deref(),
            &caller,
        )
        .await?;
    Ok(Json(json!({ "success": true, "post": post })))
}

async fn delete_post(
    State(state): State<AppState>,
    Caller(caller): Caller,
    PathParam(post_id): PathParam<String>,
) -> AppResult<Json<Value>> {
    let post = state.posts.delete(&post_id, &caller).await?;
    Ok(Json(json!({ "success": true, "post": post })))
}
