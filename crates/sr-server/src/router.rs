//! Axum router construction.
//!
//! The lookup endpoints are served both at the root and under `/api` so the
//! service can sit behind a proxy that forwards either form.

use axum::http::Method;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::context::AppContext;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    let lookups = Router::new()
        .route("/search/{title}", get(routes::search::search_series))
        .route("/suggest/{query}", get(routes::suggest::suggest_series));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/stats", get(routes::stats::stats))
        .merge(lookups.clone())
        .nest("/api", lookups)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
