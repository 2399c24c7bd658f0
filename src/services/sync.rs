//! Sync service — the protocol handler between connections and the canvas.
//!
//! DESIGN
//! ======
//! `apply` is pure business logic: it mutates the canvas for one inbound
//! event and returns an `Outcome` saying who should hear about it. The
//! dispatch layer owns delivery. Both run under the same write lock, so the
//! server finishes one mutation and enqueues its broadcast before the next
//! one starts, and every client sees broadcasts in mutation order.
//!
//! LIFECYCLE
//! =========
//! 1. `connect` registers the session, attaches its queue and sends the
//!    current snapshot to that connection alone
//! 2. `handle_text` decodes each inbound frame and dispatches it; frames from
//!    connections that are not registered are ignored
//! 3. `disconnect` detaches, unregisters and tells everyone else `user-left`
//!
//! ERROR HANDLING
//! ==============
//! Malformed frames, unknown events and invalid strokes are logged and
//! dropped. Nothing is sent back to the submitter. Undo/redo with nothing to
//! move are no-ops without a broadcast.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::frame::{ClientEvent, Frame, ServerEvent};
use crate::services::history::{Change, HistoryStore};
use crate::state::{AppState, CanvasState};

// =============================================================================
// OUTCOME
// =============================================================================

/// Who receives what after an event is applied. Handlers never send frames
/// directly.
#[derive(Debug, PartialEq)]
enum Outcome {
    /// Send to the requesting connection only.
    Reply(ServerEvent),
    /// Send to every connection except the requester.
    BroadcastExcludeSender(ServerEvent),
    /// Send to every connection including the requester.
    BroadcastAll(ServerEvent),
    /// Nothing to send.
    Silent,
}

// =============================================================================
// LIFECYCLE
// =============================================================================

/// Register a connection and send it the full canvas.
pub async fn connect(state: &AppState, connection_id: Uuid, tx: mpsc::Sender<Frame>) {
    let mut canvas = state.canvas.write().await;
    let user_id = canvas.sessions.register(connection_id).user_id;
    canvas.clients.attach(connection_id, tx);

    let snapshot = ServerEvent::Snapshot(canvas.history.snapshot());
    deliver(&canvas, connection_id, Outcome::Reply(snapshot));

    info!(
        %connection_id,
        %user_id,
        strokes = canvas.history.len(),
        connections = canvas.clients.len(),
        "sync: session active"
    );
}

/// Tear down a connection after transport loss and notify the others.
pub async fn disconnect(state: &AppState, connection_id: Uuid) {
    let mut canvas = state.canvas.write().await;
    canvas.clients.detach(connection_id);
    let Some(session) = canvas.sessions.unregister(connection_id) else {
        return;
    };

    let left = ServerEvent::UserLeft { connection_id: session.connection_id };
    deliver(&canvas, connection_id, Outcome::BroadcastExcludeSender(left));

    info!(%connection_id, remaining = canvas.sessions.len(), "sync: session closed");
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Decode one inbound text frame and dispatch it.
pub async fn handle_text(state: &AppState, connection_id: Uuid, text: &str) {
    let event = match Frame::parse(text).and_then(ClientEvent::try_from) {
        Ok(event) => event,
        Err(e) => {
            warn!(%connection_id, error = %e, "sync: dropping inbound frame");
            return;
        }
    };
    handle_event(state, connection_id, event).await;
}

/// Apply one decoded event and deliver its outcome.
pub async fn handle_event(state: &AppState, connection_id: Uuid, event: ClientEvent) {
    let mut canvas = state.canvas.write().await;
    if !canvas.sessions.is_active(connection_id) {
        warn!(%connection_id, "sync: event from inactive connection ignored");
        return;
    }

    let outcome = apply(&mut canvas, connection_id, event);
    deliver(&canvas, connection_id, outcome);
}

/// Empty the canvas and push the empty snapshot to everyone. Reset tooling;
/// not reachable over the websocket protocol.
pub async fn reset(state: &AppState) -> usize {
    let mut canvas = state.canvas.write().await;
    canvas.history.clear();

    let Some(frame) = encode(&ServerEvent::Snapshot(Vec::new())) else {
        return 0;
    };
    let notified = canvas.clients.broadcast_all(&frame);
    info!(notified, "sync: canvas reset");
    notified
}

// =============================================================================
// HANDLERS
// =============================================================================

fn apply(canvas: &mut CanvasState, connection_id: Uuid, event: ClientEvent) -> Outcome {
    match event {
        ClientEvent::StrokeSubmit(action) => {
            let added = action.clone();
            match canvas.history.append(action) {
                Ok(()) => {
                    info!(%connection_id, stroke_id = %added.id, strokes = canvas.history.len(), "sync: stroke accepted");
                    Outcome::BroadcastExcludeSender(ServerEvent::StrokeAdded(added))
                }
                Err(e) => {
                    warn!(%connection_id, stroke_id = %added.id, error = %e, "sync: stroke rejected");
                    Outcome::Silent
                }
            }
        }
        ClientEvent::HistoryRequest => Outcome::Reply(ServerEvent::Snapshot(canvas.history.snapshot())),
        ClientEvent::UndoRequest => timeline_outcome(canvas, connection_id, "undo", HistoryStore::undo),
        ClientEvent::RedoRequest => timeline_outcome(canvas, connection_id, "redo", HistoryStore::redo),
        ClientEvent::CursorUpdate(position) => {
            canvas
                .sessions
                .update_position(connection_id, position.x, position.y);
            Outcome::BroadcastExcludeSender(ServerEvent::CursorUpdate { connection_id, position })
        }
    }
}

/// Shared undo/redo rule: a change resyncs everyone with the full timeline,
/// a no-op sends nothing.
fn timeline_outcome(
    canvas: &mut CanvasState,
    connection_id: Uuid,
    op: &'static str,
    step: impl FnOnce(&mut HistoryStore) -> Change,
) -> Outcome {
    match step(&mut canvas.history) {
        Change::Changed => {
            info!(
                %connection_id,
                op,
                strokes = canvas.history.len(),
                redo_depth = canvas.history.redo_depth(),
                "sync: timeline changed"
            );
            Outcome::BroadcastAll(ServerEvent::Snapshot(canvas.history.snapshot()))
        }
        Change::NoOp => {
            debug!(%connection_id, op, "sync: timeline no-op");
            Outcome::Silent
        }
    }
}

// =============================================================================
// DELIVERY
// =============================================================================

fn deliver(canvas: &CanvasState, connection_id: Uuid, outcome: Outcome) {
    match outcome {
        Outcome::Reply(event) => {
            if let Some(frame) = encode(&event) {
                canvas.clients.send_to(connection_id, &frame);
            }
        }
        Outcome::BroadcastExcludeSender(event) => {
            if let Some(frame) = encode(&event) {
                canvas.clients.broadcast_except(connection_id, &frame);
            }
        }
        Outcome::BroadcastAll(event) => {
            if let Some(frame) = encode(&event) {
                canvas.clients.broadcast_all(&frame);
            }
        }
        Outcome::Silent => {}
    }
}

fn encode(event: &ServerEvent) -> Option<Frame> {
    match event.to_frame() {
        Ok(frame) => Some(frame),
        Err(e) => {
            warn!(event = event.name(), error = %e, "sync: failed to encode outbound frame");
            None
        }
    }
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
