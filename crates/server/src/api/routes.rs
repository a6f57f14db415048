use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::middleware::metrics_middleware;
use super::{addon, handlers};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Stremio clients load the manifest and streams from foreign origins,
    // so the whole surface must answer cross-origin requests.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Addon routes (the surface Stremio talks to)
    let addon_routes = Router::new()
        .route("/manifest.json", get(addon::manifest))
        .route("/stream/{media_type}/{id}", get(addon::stream))
        .with_state(Arc::clone(&state));

    // Operational routes
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .with_state(state);

    Router::new()
        .merge(addon_routes)
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
