//! WebSocket handler — the transport gateway.
//!
//! DESIGN
//! ======
//! On upgrade, generates a connection ID, hands the sync service an outbound
//! queue, and enters a `select!` loop:
//! - Incoming client text frames → `sync::handle_text`
//! - Frames queued by the sync service → forward to the socket
//!
//! The socket is owned by this task alone; every other task reaches the
//! client through its queue, so a slow socket only ever backs up its own
//! queue.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → `sync::connect` (session active, snapshot queued)
//! 2. Text frames dispatched until close, socket error, or send failure
//! 3. `sync::disconnect` → peers get `user-left`

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::frame::{EVENT_CURSOR_UPDATE, Frame};
use crate::services::sync;
use crate::state::AppState;

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let connection_id = Uuid::new_v4();

    // Per-connection queue the sync service fans frames into.
    let (client_tx, mut client_rx) = mpsc::channel::<Frame>(state.config.client_queue_capacity);
    sync::connect(&state, connection_id, client_tx).await;

    info!(%connection_id, "ws: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(msg) = msg else { break };
                let Ok(msg) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        sync::handle_text(&state, connection_id, &text).await;
                    }
                    Message::Binary(_) => {
                        warn!(%connection_id, "ws: binary frames are not supported");
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(frame) = client_rx.recv() => {
                if send_frame(&mut socket, connection_id, &frame).await.is_err() {
                    break;
                }
            }
        }
    }

    sync::disconnect(&state, connection_id).await;
    info!(%connection_id, "ws: client disconnected");
}

// =============================================================================
// HELPERS
// =============================================================================

async fn send_frame(socket: &mut WebSocket, connection_id: Uuid, frame: &Frame) -> Result<(), ()> {
    let json = match frame.to_text() {
        Ok(j) => j,
        Err(e) => {
            // One bad frame does not end the connection.
            warn!(%connection_id, error = %e, "ws: failed to serialize frame");
            return Ok(());
        }
    };
    if frame.event != EVENT_CURSOR_UPDATE {
        debug!(%connection_id, event = %frame.event, "ws: send frame");
    }
    socket.send(Message::Text(json.into())).await.map_err(|e| {
        warn!(%connection_id, error = %e, "ws: send failed");
    })
}
