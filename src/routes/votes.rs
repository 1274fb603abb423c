use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::auth::Identity;
use crate::db::models::VoteKind;
use crate::error::AppResult;
use crate::extractors::{Caller, PathParam};
use crate::forum::Removal;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/votes/upvotes/{post_id}",
            post(upvote).delete(remove_upvote),
        )
        .route(
            "/votes/downvotes/{post_id}",
            post(downvote).delete(remove_downvote),
        )
}

async fn upvote(
    State(state): State<AppState>,
    Caller(caller): Caller,
    PathParam(post_id): PathParam<String>,
) -> AppResult<Json<Value>> {
    cast(&state, &caller, &post_id, VoteKind::Up).await
}

async fn downvote(
    State(state): State<AppState>,
    Caller(caller): Caller,
    PathParam(post_id): PathParam<String>,
) -> AppResult<Json<Value>> {
    cast(&state, &caller, &post_id, VoteKind::Down).await
}

async fn remove_upvote(
    State(state): State<AppState>,
    Caller(caller): Caller,
    PathParam(post_id): PathParam<String>,
) -> AppResult<Json<Value>> {
    remove(&state, &caller, &post_id, VoteKind::Up).await
}

async fn remove_downvote(
    State(state): State<AppState>,
    Caller(caller): Caller,
    PathParam(post_id): PathParam<String>,
) -> AppResult<Json<Value>> {
    remove(&state, &caller, &post_id, VoteKind::Down).await
}

async fn cast(
    state: &AppState,
    caller: &Identity,
    post_id: &str,
    kind: VoteKind,
) -> AppResult<Json<Value>> {
    let vote = state.votes.cast(kind, post_id, caller).await?;
    Ok(Json(json!({ "success": true, kind.key(): vote })))
}

async fn remove(
    state: &AppState,
    caller: &Identity,
    post_id: &str,
    kind: VoteKind,
) -> AppResult<Json<Value>> {
    let body = match state.votes.remove(kind, post_id, caller).await? {
        Removal::Removed(vote) => json!({ "success": true, kind.key(): vote }),
        Removal::Missing => json!({
            "success": false,
            "message": format!("{} does not exist", kind),
        }),
    };
    Ok(Json(body))
}
