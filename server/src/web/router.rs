use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};

use crate::status::StatusSource;

use super::app_state::AppState;
use super::handlers;

/// Build the axum router with the banner, JSON API and preview routes.
pub fn build_router<S: StatusSource>(state: Arc<AppState<S>>) -> Router {
    // the banner is meant to be embedded anywhere
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::preview::<S>))
        .route("/banner.png", get(handlers::banner_png::<S>))
        .route("/api/info", get(handlers::api_info::<S>))
        .route("/api/clients", get(handlers::api_clients::<S>))
        .route("/api/channels", get(handlers::api_channels::<S>))
        .route("/health", get(handlers::health::<S>))
        .layer(cors)
        .with_state(state)
}
