//! Fluent assertions over what each peer's transport received
#![allow(dead_code)]

use classroom_relay::Envelope;

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct EnvelopeAssertion<'a> {
    setup: &'a TestSetup,
    peers: Vec<&'a str>,
}

impl<'a> EnvelopeAssertion<'a> {
    pub fn for_peers(setup: &'a TestSetup, peers: Vec<&'a str>) -> Self {
        Self { setup, peers }
    }

    pub fn for_peer(setup: &'a TestSetup, peer: &'a str) -> Self {
        Self::for_peers(setup, vec![peer])
    }

    /// Each peer received exactly one envelope of this kind; returns them
    pub fn received_once(self, kind: &str) -> Vec<Envelope> {
        self.peers
            .iter()
            .map(|peer| {
                let matching: Vec<Envelope> = self
                    .setup
                    .transport(peer)
                    .sent()
                    .into_iter()
                    .filter(|envelope| envelope.kind == kind)
                    .collect();
                assert_eq!(
                    matching.len(),
                    1,
                    "{} should have received exactly one {} envelope, got {:?}",
                    peer,
                    kind,
                    matching
                );
                matching.into_iter().next().unwrap()
            })
            .collect()
    }

    pub fn received_nothing(self) {
        for peer in &self.peers {
            let sent = self.setup.transport(peer).sent();
            assert!(
                sent.is_empty(),
                "{} should not have received anything, got {:?}",
                peer,
                sent
            );
        }
    }

    pub fn received_count(self, expected: usize) {
        for peer in &self.peers {
            assert_eq!(
                self.setup.transport(peer).sent().len(),
                expected,
                "{} received wrong number of envelopes",
                peer
            );
        }
    }
}
