//! Fan-out set — the outbound half of the transport gateway.
//!
//! DESIGN
//! ======
//! Each connection owns a bounded mpsc queue drained by its websocket task.
//! Delivery is `try_send`: it never waits, so a slow or dead recipient costs
//! the caller nothing and cannot hold up the lock the caller is under.
//!
//! Delivery is at-most-once. A full or closed queue drops that one frame for
//! that one recipient and the loop moves on to the rest.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;
use uuid::Uuid;

use crate::frame::Frame;

#[derive(Debug, Default)]
pub struct Fanout {
    clients: HashMap<Uuid, mpsc::Sender<Frame>>,
}

impl Fanout {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, connection_id: Uuid, tx: mpsc::Sender<Frame>) {
        self.clients.insert(connection_id, tx);
    }

    pub fn detach(&mut self, connection_id: Uuid) {
        self.clients.remove(&connection_id);
    }

    /// Deliver to one connection. Returns whether the frame was queued.
    pub fn send_to(&self, connection_id: Uuid, frame: &Frame) -> bool {
        let Some(tx) = self.clients.get(&connection_id) else {
            return false;
        };
        deliver(connection_id, tx, frame.clone())
    }

    /// Deliver to every connection except `exclude`. Returns the number of
    /// frames queued.
    pub fn broadcast_except(&self, exclude: Uuid, frame: &Frame) -> usize {
        self.fan_out(frame, Some(exclude))
    }

    /// Deliver to every connection. Returns the number of frames queued.
    pub fn broadcast_all(&self, frame: &Frame) -> usize {
        self.fan_out(frame, None)
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.clients.len()
    }

    fn fan_out(&self, frame: &Frame, exclude: Option<Uuid>) -> usize {
        let mut delivered = 0;
        for (connection_id, tx) in &self.clients {
            if exclude == Some(*connection_id) {
                continue;
            }
            if deliver(*connection_id, tx, frame.clone()) {
                delivered += 1;
            }
        }
        delivered
    }
}

fn deliver(connection_id: Uuid, tx: &mpsc::Sender<Frame>, frame: Frame) -> bool {
    match tx.try_send(frame) {
        Ok(()) => true,
        Err(TrySendError::Full(frame)) => {
            warn!(%connection_id, event = %frame.event, "fanout: queue full, dropping frame");
            false
        }
        Err(TrySendError::Closed(frame)) => {
            warn!(%connection_id, event = %frame.event, "fanout: queue closed, dropping frame");
            false
        }
    }
}

#[cfg(test)]
#[path = "fanout_test.rs"]
mod tests;
