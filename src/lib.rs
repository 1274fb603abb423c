// Library exports for Agora
// This allows integration tests and external code to use Agora modules

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod forum;
pub mod repository;
pub mod routes;
pub mod state;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Every route of the service, with request tracing and a JSON 404 fallback.
/// A known path hit with an unsupported method falls through to the same 404.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::home::index))
        .merge(routes::posts::router())
        .merge(routes::subreddits::router())
        .merge(routes::users::router())
        .merge(routes::votes::router())
        .fallback(routes::home::not_found)
        .method_not_allowed_fallback(routes::home::not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
