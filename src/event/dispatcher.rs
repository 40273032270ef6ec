use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::{
    events::{Envelope, InboundEvent},
    routing::{RouteStrategy, RoutingPolicy},
};
use crate::metrics::RelayMetrics;
use crate::registry::PeerHandle;
use crate::relay::PeerRelay;
use crate::shared::RelayError;

/// Outcome of routing one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub strategy: RouteStrategy,
    /// Peers the transport accepted the envelope for
    pub delivered: Vec<String>,
    /// Peers whose send failed
    pub failed: Vec<String>,
    /// Unicast target was not registered
    pub dropped: bool,
}

impl DeliveryReport {
    fn new(strategy: RouteStrategy) -> Self {
        Self {
            strategy,
            delivered: Vec::new(),
            failed: Vec::new(),
            dropped: false,
        }
    }
}

/// Routes application events to one peer or to a whole channel.
///
/// Delivery is best-effort and at-most-once: failed sends are logged and
/// counted, never retried, and never stop the rest of a fanout.
#[derive(Clone)]
pub struct EventDispatcher {
    relay: PeerRelay,
    policy: Arc<RoutingPolicy>,
    metrics: Arc<RelayMetrics>,
}

impl EventDispatcher {
    pub fn new(relay: PeerRelay, policy: RoutingPolicy, metrics: Arc<RelayMetrics>) -> Self {
        Self {
            relay,
            policy: Arc::new(policy),
            metrics,
        }
    }

    pub fn classify(&self, event: &InboundEvent) -> Result<RouteStrategy, RelayError> {
        self.policy.classify(&event.kind)
    }

    /// Delivers the event. Errors only for malformed events; delivery
    /// problems are reported in the returned `DeliveryReport`.
    #[instrument(skip(self, event), fields(kind = %event.kind, source_peer_id = %event.source_peer_id))]
    pub async fn route(&self, event: InboundEvent) -> Result<DeliveryReport, RelayError> {
        match self.classify(&event)? {
            RouteStrategy::Unicast => self.unicast(event).await,
            RouteStrategy::Broadcast => self.broadcast(event).await,
        }
    }

    async fn unicast(&self, event: InboundEvent) -> Result<DeliveryReport, RelayError> {
        let target = event
            .target_peer_id
            .clone()
            .ok_or_else(|| RelayError::MissingTarget(event.kind.clone()))?;
        let mut report = DeliveryReport::new(RouteStrategy::Unicast);

        let Some(peer) = self.relay.lookup(&target).await else {
            warn!(
                target_peer_id = %target,
                kind = %event.kind,
                "Unicast target not registered, dropping event"
            );
            self.metrics.record_unicast_dropped();
            report.dropped = true;
            return Ok(report);
        };

        let envelope = self.envelope_for(event).await;
        self.deliver(&target, &peer.handle, &envelope, &mut report);
        Ok(report)
    }

    async fn broadcast(&self, event: InboundEvent) -> Result<DeliveryReport, RelayError> {
        let channel_id = event
            .channel_id
            .clone()
            .ok_or_else(|| RelayError::MissingChannel(event.kind.clone()))?;
        let mut report = DeliveryReport::new(RouteStrategy::Broadcast);

        let recipients = self.relay.recipients(&channel_id).await;
        let envelope = self.envelope_for(event).await;
        for (peer_id, handle) in &recipients {
            self.deliver(peer_id, handle, &envelope, &mut report);
        }

        debug!(
            channel_id = %channel_id,
            delivered = report.delivered.len(),
            failed = report.failed.len(),
            "Broadcast complete"
        );
        Ok(report)
    }

    fn deliver(
        &self,
        peer_id: &str,
        handle: &PeerHandle,
        envelope: &Envelope,
        report: &mut DeliveryReport,
    ) {
        match handle.send(envelope) {
            Ok(()) => {
                self.metrics.record_delivered();
                report.delivered.push(peer_id.to_string());
            }
            Err(e) => {
                warn!(
                    peer_id = %peer_id,
                    channel_id = ?envelope.channel_id,
                    kind = %envelope.kind,
                    error = %e,
                    "Transport send failed"
                );
                self.metrics.record_delivery_failure();
                report.failed.push(peer_id.to_string());
            }
        }
    }

    /// Falls back to the identity bound to the source peer when the event
    /// carries no user id.
    async fn envelope_for(&self, event: InboundEvent) -> Envelope {
        let user_id = match event.user_id {
            Some(user_id) => Some(user_id),
            None => self
                .relay
                .lookup(&event.source_peer_id)
                .await
                .and_then(|peer| peer.user_id),
        };

        Envelope {
            kind: event.kind,
            channel_id: event.channel_id,
            payload: event.payload,
            user_id,
            from_peer_id: event.source_peer_id,
        }
    }
}
