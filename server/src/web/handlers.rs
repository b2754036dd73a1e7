use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderName, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::status::StatusSource;

use super::app_state::AppState;
use super::preview::preview_page;

const BANNER_SYSTEM: &str = "ts-banner/1.0";

/// GET /banner.png
pub async fn banner_png<S: StatusSource>(State(state): State<Arc<AppState<S>>>) -> Response {
    let render = &state.render;
    match render.render_banner().await {
        Ok(png) => (
            [
                (header::CONTENT_TYPE, "image/png".to_string()),
                (header::CONTENT_LENGTH, png.len().to_string()),
                (
                    header::CACHE_CONTROL,
                    format!("public, max-age={}", render.cache.ttl_secs()),
                ),
                (HeaderName::from_static("x-banner-system"), BANNER_SYSTEM.to_string()),
            ],
            png.as_ref().clone(),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "{}", render.strings.server_banner_error);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": render.strings.server_banner_render_fail,
                    "details": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

/// GET /api/info
pub async fn api_info<S: StatusSource>(State(state): State<Arc<AppState<S>>>) -> impl IntoResponse {
    Json(state.render.source.server_info().await)
}

/// GET /api/clients
pub async fn api_clients<S: StatusSource>(State(state): State<Arc<AppState<S>>>) -> impl IntoResponse {
    Json(state.render.source.clients().await)
}

/// GET /api/channels
pub async fn api_channels<S: StatusSource>(State(state): State<Arc<AppState<S>>>) -> impl IntoResponse {
    Json(state.render.source.channels().await)
}

/// GET /health
pub async fn health<S: StatusSource>(State(state): State<Arc<AppState<S>>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "uptime": state.started.elapsed().as_secs_f64(),
    }))
}

/// GET /
pub async fn preview<S: StatusSource>(State(state): State<Arc<AppState<S>>>) -> Html<String> {
    let render = &state.render;
    Html(preview_page(render.strings, render.cache.ttl_secs()))
}
