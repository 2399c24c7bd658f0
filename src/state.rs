//! Shared application state and the canvas data model.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the single live canvas: stroke history, connected sessions and
//! the outbound fan-out set, all behind one `RwLock` so that every mutation
//! and the broadcast it triggers happen as one serialized step.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::Config;
use crate::services::fanout::Fanout;
use crate::services::history::HistoryStore;
use crate::services::session::SessionRegistry;

// =============================================================================
// STROKE ACTION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Brush,
    Eraser,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One completed pen or eraser gesture. Never mutated after acceptance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeAction {
    /// Client-generated unique token.
    pub id: String,
    pub tool: Tool,
    /// Display hint, opaque to the server.
    pub color: String,
    pub line_width: f64,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("stroke id is empty")]
    EmptyId,
    #[error("stroke needs at least 2 points, got {0}")]
    TooFewPoints(usize),
    #[error("stroke has {count} points, limit is {max}")]
    TooManyPoints { count: usize, max: usize },
    #[error("line width must be positive, got {0}")]
    InvalidLineWidth(f64),
    #[error("stroke id already accepted: {0}")]
    DuplicateId(String),
}

impl StrokeAction {
    /// Check the shape of a submitted stroke. Duplicate ids are checked by the
    /// history store, which is the only place that knows what was accepted.
    ///
    /// # Errors
    ///
    /// Returns the first rule the stroke breaks.
    pub fn validate(&self, max_points: usize) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::EmptyId);
        }
        if self.points.len() < 2 {
            return Err(ValidationError::TooFewPoints(self.points.len()));
        }
        if self.points.len() > max_points {
            return Err(ValidationError::TooManyPoints { count: self.points.len(), max: max_points });
        }
        if !self.line_width.is_finite() || self.line_width <= 0.0 {
            return Err(ValidationError::InvalidLineWidth(self.line_width));
        }
        Ok(())
    }
}

// =============================================================================
// CURSOR
// =============================================================================

/// Last reported pointer position. Not bounds-checked; off-canvas positions
/// are the client's rendering concern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorPosition {
    pub x: f64,
    pub y: f64,
}

// =============================================================================
// CANVAS STATE
// =============================================================================

/// The live shared canvas. Only ever touched through `AppState::canvas`.
pub struct CanvasState {
    pub history: HistoryStore,
    pub sessions: SessionRegistry,
    /// Connected clients: `connection_id` -> sender for outgoing frames.
    pub clients: Fanout,
}

impl CanvasState {
    #[must_use]
    pub fn new(max_stroke_points: usize) -> Self {
        Self {
            history: HistoryStore::new(max_stroke_points),
            sessions: SessionRegistry::new(),
            clients: Fanout::new(),
        }
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub canvas: Arc<RwLock<CanvasState>>,
    pub config: Arc<Config>,
}

impl AppState {
    #[must_use]
    pub fn new(config: Config) -> Self {
        let canvas = CanvasState::new(config.max_stroke_points);
        Self { canvas: Arc::new(RwLock::new(canvas)), config: Arc::new(config) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
