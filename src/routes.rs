use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::sync::Arc;

use crate::handlers::{self, AppState};

/// Builds the HTTP router.
///
/// Every method/path that is not a read endpoint falls through to
/// [`handlers::submit_quote`], so the route mode alone decides what counts as a
/// submission and what is answered with 404. Request bodies are capped at
/// `max_body_bytes`.
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_body_bytes);

    Router::new()
        .route(
            "/health",
            get(handlers::health).fallback(handlers::submit_quote),
        )
        .route(
            "/quotes/:id",
            get(handlers::get_quote).fallback(handlers::submit_quote),
        )
        .fallback(handlers::submit_quote)
        .layer(body_limit)
        .with_state(state)
}
