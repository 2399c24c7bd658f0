//! Frame — the wire envelope for every websocket message.
//!
//! ARCHITECTURE
//! ============
//! Every message in either direction is one JSON text frame of the shape
//! `{"event": "<name>", "data": <payload>}`. The event names are the stable
//! contract with browser clients; the gateway parses the envelope, the sync
//! service decodes `data` according to `event`.
//!
//! DESIGN
//! ======
//! - Inbound frames are decoded into `ClientEvent` in one place so handlers
//!   only see typed payloads.
//! - Outbound frames are built from `ServerEvent`, serialized once, and the
//!   resulting `Frame` is cloned per recipient.
//! - `ts` is stamped on outbound frames; inbound frames may omit it.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::{CursorPosition, StrokeAction};

// =============================================================================
// EVENT NAMES
// =============================================================================

pub const EVENT_STROKE_SUBMIT: &str = "stroke-submit";
pub const EVENT_HISTORY_REQUEST: &str = "history-request";
pub const EVENT_UNDO_REQUEST: &str = "undo-request";
pub const EVENT_REDO_REQUEST: &str = "redo-request";
pub const EVENT_CURSOR_UPDATE: &str = "cursor-update";

pub const EVENT_SNAPSHOT: &str = "snapshot";
pub const EVENT_STROKE_ADDED: &str = "stroke-added";
pub const EVENT_USER_LEFT: &str = "user-left";

// =============================================================================
// FRAME
// =============================================================================

/// The universal message envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
    /// Milliseconds since Unix epoch.
    #[serde(default)]
    pub ts: i64,
}

/// Current time as milliseconds since Unix epoch.
fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

impl Frame {
    pub fn new(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self { event: event.into(), data, ts: now_ms() }
    }

    /// Parse a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Malformed` if the text is not a frame.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize to a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Malformed` if serialization fails.
    pub fn to_text(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unknown event: {0}")]
    UnknownEvent(String),
}

// =============================================================================
// INBOUND
// =============================================================================

/// Decoded inbound event.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    StrokeSubmit(StrokeAction),
    HistoryRequest,
    UndoRequest,
    RedoRequest,
    CursorUpdate(CursorPosition),
}

impl TryFrom<Frame> for ClientEvent {
    type Error = ProtocolError;

    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        match frame.event.as_str() {
            EVENT_STROKE_SUBMIT => Ok(Self::StrokeSubmit(serde_json::from_value(frame.data)?)),
            EVENT_HISTORY_REQUEST => Ok(Self::HistoryRequest),
            EVENT_UNDO_REQUEST => Ok(Self::UndoRequest),
            EVENT_REDO_REQUEST => Ok(Self::RedoRequest),
            EVENT_CURSOR_UPDATE => Ok(Self::CursorUpdate(serde_json::from_value(frame.data)?)),
            _ => Err(ProtocolError::UnknownEvent(frame.event)),
        }
    }
}

// =============================================================================
// OUTBOUND
// =============================================================================

/// Event produced by the sync service for delivery to clients.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Snapshot(Vec<StrokeAction>),
    StrokeAdded(StrokeAction),
    CursorUpdate { connection_id: Uuid, position: CursorPosition },
    UserLeft { connection_id: Uuid },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CursorPayload {
    x: f64,
    y: f64,
    connection_id: Uuid,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserLeftPayload {
    connection_id: Uuid,
}

impl ServerEvent {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Snapshot(_) => EVENT_SNAPSHOT,
            Self::StrokeAdded(_) => EVENT_STROKE_ADDED,
            Self::CursorUpdate { .. } => EVENT_CURSOR_UPDATE,
            Self::UserLeft { .. } => EVENT_USER_LEFT,
        }
    }

    /// Build the outbound frame.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Malformed` if the payload fails to serialize.
    pub fn to_frame(&self) -> Result<Frame, ProtocolError> {
        let data = match self {
            Self::Snapshot(actions) => serde_json::to_value(actions)?,
            Self::StrokeAdded(action) => serde_json::to_value(action)?,
            Self::CursorUpdate { connection_id, position } => {
                serde_json::to_value(CursorPayload { x: position.x, y: position.y, connection_id: *connection_id })?
            }
            Self::UserLeft { connection_id } => {
                serde_json::to_value(UserLeftPayload { connection_id: *connection_id })?
            }
        };
        Ok(Frame::new(self.name(), data))
    }
}

#[cfg(test)]
#[path = "frame_test.rs"]
mod tests;
