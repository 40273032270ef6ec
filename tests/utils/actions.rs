#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::Arc;

use classroom_relay::{DeliveryReport, InboundEvent};

use super::mocks::RecordingTransport;
use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    pub fn transport(&self, peer: &str) -> &Arc<RecordingTransport> {
        self.transports
            .get(peer)
            .unwrap_or_else(|| panic!("no transport for {}", peer))
    }

    pub fn clear_envelopes(&self) {
        for transport in self.transports.values() {
            transport.clear();
        }
    }

    /// Connects an additional peer
    pub async fn connect(&mut self, peer: &str) -> Arc<RecordingTransport> {
        let transport = RecordingTransport::new();
        self.hooks.on_connect(peer, transport.clone()).await;
        self.transports.insert(peer.to_string(), transport.clone());
        transport
    }

    pub async fn broadcast_chat(&self, from: &str, channel_id: &str, text: &str) -> DeliveryReport {
        self.dispatcher
            .route(InboundEvent::to_channel("chat", from, channel_id, json!({ "text": text })))
            .await
            .expect("chat broadcast should route")
    }

    pub async fn send_object_sync(&self, from: &str, to: &str, payload: Value) -> DeliveryReport {
        self.dispatcher
            .route(InboundEvent::to_peer("object-sync", from, to, payload))
            .await
            .expect("object-sync should route")
    }
}
