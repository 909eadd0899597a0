//! API routes.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers::{health, recortar_rosto};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

    let api_routes = Router::new().route("/recortar-rosto", post(recortar_rosto));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health))
        .nest_service(&config.public_path, ServeDir::new(&config.upload_dir))
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins))
        .with_state(state)
}

/// CORS for the browser front end.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(600));

    if origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer.allow_origin(origins)
    }
}
