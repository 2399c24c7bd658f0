//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the websocket endpoint and the small HTTP surface under one Axum
//! router. When `STATIC_DIR` is configured the browser client is served from
//! it as the fallback, so one process hosts both the page and its socket.

pub mod canvas;
pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/ws", get(ws::handle_ws))
        .route("/api/canvas", get(canvas::get_canvas))
        .route("/healthz", get(healthz));

    if state.config.dev_reset_enabled {
        router = router.route("/api/dev/reset", post(canvas::dev_reset));
    }

    if let Some(dir) = &state.config.static_dir {
        let static_files = ServeDir::new(dir).append_index_html_on_directories(true);
        router = router.fallback_service(static_files);
    }

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
