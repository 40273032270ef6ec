//! Test doubles for the transport and the presence sink
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use classroom_relay::{Envelope, PresenceNotice, PresenceSink, TransportError, TransportHandle};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Transport that records every envelope, or fails every send when built
/// with `failing()`
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Envelope>>,
    fail: bool,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn sent(&self) -> Vec<Envelope> {
        self.sent.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

impl TransportHandle for RecordingTransport {
    fn send(&self, envelope: &Envelope) -> Result<(), TransportError> {
        if self.fail {
            return Err(TransportError::SendFailed("connection reset by peer".to_string()));
        }
        self.sent.lock().unwrap().push(envelope.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct RecordingPresenceSink {
    notices: Arc<Mutex<Vec<PresenceNotice>>>,
}

impl RecordingPresenceSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<PresenceNotice> {
        self.notices.lock().unwrap().clone()
    }
}

#[async_trait]
impl PresenceSink for RecordingPresenceSink {
    async fn peer_departed(&self, notice: PresenceNotice) {
        self.notices.lock().unwrap().push(notice);
    }
}
