use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::presence::{PresenceNotice, PresenceSink};
use crate::event::{kinds, EventDispatcher, InboundEvent};
use crate::metrics::RelayMetrics;
use crate::registry::{ConnectionId, TransportHandle};
use crate::relay::{Departure, PeerRelay};
use crate::shared::RelayError;

/// Transport callbacks and membership commands.
///
/// Keeps the registry and index consistent and turns membership changes into
/// presence broadcasts.
#[derive(Clone)]
pub struct LifecycleHooks {
    relay: PeerRelay,
    dispatcher: EventDispatcher,
    presence_sink: Arc<dyn PresenceSink>,
    metrics: Arc<RelayMetrics>,
}

impl LifecycleHooks {
    pub fn new(
        relay: PeerRelay,
        dispatcher: EventDispatcher,
        presence_sink: Arc<dyn PresenceSink>,
        metrics: Arc<RelayMetrics>,
    ) -> Self {
        Self {
            relay,
            dispatcher,
            presence_sink,
            metrics,
        }
    }

    /// Registers the peer. A replaced instance leaves its channels, and the
    /// remaining members of each get a presence-left.
    #[instrument(skip(self, transport))]
    pub async fn on_connect(&self, peer_id: &str, transport: Arc<dyn TransportHandle>) -> ConnectionId {
        let (connection_id, replaced) = self.relay.register(peer_id, transport).await;
        self.metrics.record_registered(replaced.is_some());
        info!(
            peer_id = %peer_id,
            connection_id = %connection_id,
            replaced = replaced.is_some(),
            "Peer connected"
        );

        if let Some(previous) = replaced {
            for channel_id in &previous.channels {
                self.emit_presence(
                    kinds::PRESENCE_LEFT,
                    peer_id,
                    previous.user_id.clone(),
                    channel_id,
                )
                .await;
            }
        }
        connection_id
    }

    /// Tears the peer down. Redelivered disconnects find the peer already
    /// absent and do nothing.
    #[instrument(skip(self))]
    pub async fn on_disconnect(&self, peer_id: &str) -> Option<PresenceNotice> {
        match self.relay.unregister(peer_id).await {
            Some(departure) => Some(self.announce_departure(departure).await),
            None => {
                debug!(peer_id = %peer_id, "Disconnect for peer already absent");
                None
            }
        }
    }

    /// Disconnect from a specific connection. Ignored if the peer id has
    /// since been re-registered by a newer connection.
    #[instrument(skip(self))]
    pub async fn on_disconnect_instance(
        &self,
        peer_id: &str,
        connection_id: ConnectionId,
    ) -> Option<PresenceNotice> {
        let departure = self.relay.unregister_instance(peer_id, connection_id).await?;
        Some(self.announce_departure(departure).await)
    }

    pub async fn bind_user(&self, peer_id: &str, user_id: &str) -> Result<(), RelayError> {
        self.relay.bind_user(peer_id, user_id).await
    }

    /// Joins the channel and announces it to the channel, joiner included.
    pub async fn join_channel(&self, peer_id: &str, channel_id: &str) -> Result<bool, RelayError> {
        if !self.relay.join(peer_id, channel_id).await? {
            return Ok(false);
        }
        let user_id = self.relay.lookup(peer_id).await.and_then(|peer| peer.user_id);
        self.emit_presence(kinds::PRESENCE_JOINED, peer_id, user_id, channel_id)
            .await;
        Ok(true)
    }

    /// Leaves the channel and announces it to the remaining members.
    pub async fn leave_channel(&self, peer_id: &str, channel_id: &str) -> bool {
        let user_id = self.relay.lookup(peer_id).await.and_then(|peer| peer.user_id);
        if !self.relay.leave(peer_id, channel_id).await {
            return false;
        }
        self.emit_presence(kinds::PRESENCE_LEFT, peer_id, user_id, channel_id)
            .await;
        true
    }

    async fn announce_departure(&self, departure: Departure) -> PresenceNotice {
        self.metrics.record_disconnected();

        for channel_id in &departure.channels {
            self.emit_presence(
                kinds::PRESENCE_LEFT,
                &departure.peer_id,
                departure.user_id.clone(),
                channel_id,
            )
            .await;
        }

        let notice = PresenceNotice {
            peer_id: departure.peer_id,
            user_id: departure.user_id,
            channels: departure.channels,
            connection_id: departure.connection_id,
            disconnected_at: Utc::now(),
        };
        info!(
            peer_id = %notice.peer_id,
            user_id = ?notice.user_id,
            channel_count = notice.channels.len(),
            "Peer disconnected"
        );
        self.presence_sink.peer_departed(notice.clone()).await;
        notice
    }

    async fn emit_presence(
        &self,
        kind: &str,
        peer_id: &str,
        user_id: Option<String>,
        channel_id: &str,
    ) {
        let mut event = InboundEvent::to_channel(
            kind,
            peer_id,
            channel_id,
            json!({ "peerId": peer_id, "userId": user_id }),
        );
        event.user_id = user_id;

        match self.dispatcher.route(event).await {
            Ok(_) => self.metrics.record_presence_event(),
            Err(e) => {
                warn!(
                    peer_id = %peer_id,
                    channel_id = %channel_id,
                    kind = %kind,
                    error = %e,
                    "Presence event could not be routed"
                );
            }
        }
    }
}
