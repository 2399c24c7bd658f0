//! Session registry — who is connected and where their cursor was last seen.
//!
//! A session exists from transport connect to transport loss and is never
//! persisted. Connection identity and user identity are kept as separate
//! fields even though they are currently equal; resuming a session on a new
//! connection would change one without the other.

use std::collections::HashMap;

use uuid::Uuid;

use crate::state::CursorPosition;

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub connection_id: Uuid,
    pub user_id: Uuid,
    /// `None` until the first cursor report.
    pub cursor: Option<CursorPosition>,
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<Uuid, Session>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session for a freshly connected transport. Re-registering an
    /// existing connection resets its cursor.
    pub fn register(&mut self, connection_id: Uuid) -> &Session {
        let session = Session { connection_id, user_id: connection_id, cursor: None };
        self.sessions.insert(connection_id, session);
        &self.sessions[&connection_id]
    }

    /// Remove a session. The returned record tells callers whose cursor to
    /// erase; `None` means the connection was never registered.
    pub fn unregister(&mut self, connection_id: Uuid) -> Option<Session> {
        self.sessions.remove(&connection_id)
    }

    /// Record the latest cursor position, creating the session if needed.
    pub fn update_position(&mut self, connection_id: Uuid, x: f64, y: f64) {
        let session = self
            .sessions
            .entry(connection_id)
            .or_insert_with(|| Session { connection_id, user_id: connection_id, cursor: None });
        session.cursor = Some(CursorPosition { x, y });
    }

    #[must_use]
    pub fn get(&self, connection_id: Uuid) -> Option<&Session> {
        self.sessions.get(&connection_id)
    }

    #[must_use]
    pub fn is_active(&self, connection_id: Uuid) -> bool {
        self.get(connection_id).is_some()
    }

    /// Active sessions in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
