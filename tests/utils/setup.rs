#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use classroom_relay::{
    metrics::RelayMetrics, EventDispatcher, LifecycleHooks, PeerRelay, RoutingPolicy,
};

use super::mocks::{RecordingPresenceSink, RecordingTransport};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub relay: PeerRelay,
    pub dispatcher: EventDispatcher,
    pub hooks: LifecycleHooks,
    pub metrics: Arc<RelayMetrics>,
    pub presence_sink: RecordingPresenceSink,
    pub transports: HashMap<String, Arc<RecordingTransport>>,
}

pub struct TestSetupBuilder {
    peers: Vec<(String, bool)>,
    memberships: Vec<(String, String)>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            peers: vec![],
            memberships: vec![],
        }
    }

    pub fn with_peers(mut self, peers: Vec<&str>) -> Self {
        self.peers
            .extend(peers.into_iter().map(|peer| (peer.to_string(), false)));
        self
    }

    /// A peer whose transport rejects every send
    pub fn with_failing_peer(mut self, peer: &str) -> Self {
        self.peers.push((peer.to_string(), true));
        self
    }

    pub fn in_channel(mut self, channel_id: &str, peers: Vec<&str>) -> Self {
        self.memberships.extend(
            peers
                .into_iter()
                .map(|peer| (peer.to_string(), channel_id.to_string())),
        );
        self
    }

    /// Classroom "math-101" with students A, B and C
    pub fn with_math_class(self) -> Self {
        self.with_peers(vec!["A", "B", "C"])
            .in_channel("math-101", vec!["A", "B", "C"])
    }

    pub async fn build(self) -> TestSetup {
        let relay = PeerRelay::new();
        let metrics = Arc::new(RelayMetrics::new());
        let presence_sink = RecordingPresenceSink::new();
        let dispatcher =
            EventDispatcher::new(relay.clone(), RoutingPolicy::default(), metrics.clone());
        let hooks = LifecycleHooks::new(
            relay.clone(),
            dispatcher.clone(),
            Arc::new(presence_sink.clone()),
            metrics.clone(),
        );

        let mut transports = HashMap::new();
        for (peer, failing) in &self.peers {
            let transport = if *failing {
                RecordingTransport::failing()
            } else {
                RecordingTransport::new()
            };
            hooks.on_connect(peer, transport.clone()).await;
            transports.insert(peer.clone(), transport);
        }

        for (peer, channel_id) in &self.memberships {
            hooks.join_channel(peer, channel_id).await.unwrap();
        }

        let setup = TestSetup {
            relay,
            dispatcher,
            hooks,
            metrics,
            presence_sink,
            transports,
        };
        // Start every test from an empty outbox
        setup.clear_envelopes();
        setup
    }
}
