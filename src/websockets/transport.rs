use std::sync::Arc;
use tokio::sync::{mpsc, Notify};

use crate::event::Envelope;
use crate::registry::{TransportError, TransportHandle};

/// Transport handle for a WebSocket connection.
///
/// Envelopes are serialized and queued on the connection's outbound channel;
/// the socket task writes them out. `close` asks that task to shut down.
pub struct ChannelTransport {
    sender: mpsc::UnboundedSender<String>,
    shutdown: Arc<Notify>,
}

impl ChannelTransport {
    pub fn new(sender: mpsc::UnboundedSender<String>, shutdown: Arc<Notify>) -> Self {
        Self { sender, shutdown }
    }
}

impl TransportHandle for ChannelTransport {
    fn send(&self, envelope: &Envelope) -> Result<(), TransportError> {
        let message =
            serde_json::to_string(envelope).map_err(|e| TransportError::SendFailed(e.to_string()))?;
        self.sender
            .send(message)
            .map_err(|_| TransportError::Closed)
    }

    fn close(&self) {
        self.shutdown.notify_one();
    }
}
