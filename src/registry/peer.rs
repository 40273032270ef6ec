use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::event::Envelope;

/// Identifies one registration of a peer. A reconnect under the same peer id
/// always gets a new one.
pub type ConnectionId = Uuid;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport closed")]
    Closed,

    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Send primitive supplied by the transport layer.
///
/// Implementations must not block: `send` either hands the envelope off to an
/// outbound queue or fails immediately.
pub trait TransportHandle: Send + Sync {
    fn send(&self, envelope: &Envelope) -> Result<(), TransportError>;

    /// Called when the registry stops using this handle.
    fn close(&self) {}
}

/// Registry-owned wrapper around a transport handle
pub struct PeerHandle {
    connection_id: ConnectionId,
    transport: Arc<dyn TransportHandle>,
    alive: AtomicBool,
}

impl PeerHandle {
    pub fn new(transport: Arc<dyn TransportHandle>) -> Self {
        Self {
            connection_id: Uuid::new_v4(),
            transport,
            alive: AtomicBool::new(true),
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Sends through the transport unless the handle has been retired.
    pub fn send(&self, envelope: &Envelope) -> Result<(), TransportError> {
        if !self.is_alive() {
            return Err(TransportError::Closed);
        }
        match self.transport.send(envelope) {
            Err(TransportError::Closed) => {
                self.alive.store(false, Ordering::SeqCst);
                Err(TransportError::Closed)
            }
            other => other,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Marks the handle dead and closes the transport. Only the first call
    /// reaches the transport.
    pub fn retire(&self) {
        if self.alive.swap(false, Ordering::SeqCst) {
            self.transport.close();
        }
    }
}

impl fmt::Debug for PeerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerHandle")
            .field("connection_id", &self.connection_id)
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// A live peer as seen by the registry
#[derive(Debug, Clone)]
pub struct PeerConnection {
    pub peer_id: String,
    pub user_id: Option<String>,
    pub channels: BTreeSet<String>,
    pub handle: Arc<PeerHandle>,
    pub connected_at: DateTime<Utc>,
}

impl PeerConnection {
    pub fn new(peer_id: String, handle: Arc<PeerHandle>) -> Self {
        Self {
            peer_id,
            user_id: None,
            channels: BTreeSet::new(),
            handle,
            connected_at: Utc::now(),
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.handle.connection_id()
    }
}
