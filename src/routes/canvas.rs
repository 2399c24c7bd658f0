//! Read-only canvas view and reset tooling over HTTP.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::services::sync;
use crate::state::{AppState, CursorPosition, StrokeAction};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasResponse {
    pub strokes: Vec<StrokeAction>,
    pub redo_depth: usize,
    pub connections: usize,
    pub cursors: Vec<CursorResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorResponse {
    pub connection_id: Uuid,
    pub user_id: Uuid,
    pub x: f64,
    pub y: f64,
}

/// `GET /api/canvas` — current timeline, redo depth and the last known
/// cursor of every session that has reported one.
pub async fn get_canvas(State(state): State<AppState>) -> Json<CanvasResponse> {
    let canvas = state.canvas.read().await;
    let cursors = canvas
        .sessions
        .iter()
        .filter_map(|session| {
            let CursorPosition { x, y } = session.cursor?;
            Some(CursorResponse { connection_id: session.connection_id, user_id: session.user_id, x, y })
        })
        .collect();

    Json(CanvasResponse {
        strokes: canvas.history.snapshot(),
        redo_depth: canvas.history.redo_depth(),
        connections: canvas.sessions.len(),
        cursors,
    })
}

/// `POST /api/dev/reset` — wipe the canvas and resync every client. Only
/// routed when `DEV_RESET_ENABLED` is set.
pub async fn dev_reset(State(state): State<AppState>) -> StatusCode {
    sync::reset(&state).await;
    StatusCode::NO_CONTENT
}

#[cfg(test)]
#[path = "canvas_test.rs"]
mod tests;
