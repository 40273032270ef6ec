use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::membership::ChannelMembershipIndex;
use crate::registry::{
    ConnectionId, ConnectionRegistry, PeerConnection, PeerHandle, TransportHandle, Unregistered,
};
use crate::shared::RelayError;

/// A peer taken out of the registry, with everything it held at the time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub peer_id: String,
    pub connection_id: ConnectionId,
    pub user_id: Option<String>,
    pub channels: BTreeSet<String>,
}

/// Registry plus membership index, mutated only together
#[derive(Debug, Default)]
pub struct RelayState {
    registry: ConnectionRegistry,
    index: ChannelMembershipIndex,
}

impl RelayState {
    pub fn is_consistent(&self) -> bool {
        self.index.is_consistent_with(&self.registry)
    }

    fn register(
        &mut self,
        peer_id: &str,
        transport: Arc<dyn TransportHandle>,
    ) -> (ConnectionId, Option<Departure>) {
        let registration = self.registry.register(peer_id, transport);
        let replaced = registration.replaced.map(|previous| {
            // The new instance starts with no channels.
            self.index.remove_peer(peer_id, &previous.channels);
            Departure {
                peer_id: peer_id.to_string(),
                connection_id: previous.connection_id(),
                user_id: previous.user_id,
                channels: previous.channels,
            }
        });
        (registration.connection_id, replaced)
    }

    fn unregister(&mut self, peer_id: &str) -> Option<Departure> {
        match self.registry.unregister(peer_id) {
            Unregistered::Removed {
                connection_id,
                user_id,
                channels,
            } => {
                self.index.remove_peer(peer_id, &channels);
                Some(Departure {
                    peer_id: peer_id.to_string(),
                    connection_id,
                    user_id,
                    channels,
                })
            }
            Unregistered::AlreadyAbsent => None,
        }
    }
}

/// Shared handle to the relay state.
///
/// Every mutation runs under the write lock and touches only in-memory maps,
/// so mutations are totally ordered and no lock is held across transport I/O.
#[derive(Debug, Clone, Default)]
pub struct PeerRelay {
    state: Arc<RwLock<RelayState>>,
}

impl PeerRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a peer. Returns the new connection id and, if a live entry
    /// under the same id was replaced, what that instance held.
    #[instrument(skip(self, transport))]
    pub async fn register(
        &self,
        peer_id: &str,
        transport: Arc<dyn TransportHandle>,
    ) -> (ConnectionId, Option<Departure>) {
        let mut state = self.state.write().await;
        state.register(peer_id, transport)
    }

    /// Removes the peer and its memberships in one step. `None` if the peer
    /// was already absent.
    #[instrument(skip(self))]
    pub async fn unregister(&self, peer_id: &str) -> Option<Departure> {
        let mut state = self.state.write().await;
        state.unregister(peer_id)
    }

    /// Like `unregister`, but only if `connection_id` is still the live
    /// instance for this peer.
    #[instrument(skip(self))]
    pub async fn unregister_instance(
        &self,
        peer_id: &str,
        connection_id: ConnectionId,
    ) -> Option<Departure> {
        let mut state = self.state.write().await;
        match state.registry.connection_id_of(peer_id) {
            Some(current) if current == connection_id => state.unregister(peer_id),
            Some(current) => {
                info!(
                    peer_id = %peer_id,
                    stale_connection_id = %connection_id,
                    live_connection_id = %current,
                    "Ignoring disconnect from replaced connection"
                );
                None
            }
            None => None,
        }
    }

    pub async fn bind_user(&self, peer_id: &str, user_id: &str) -> Result<(), RelayError> {
        let mut state = self.state.write().await;
        state.registry.bind_user(peer_id, user_id)?;
        debug!(peer_id = %peer_id, user_id = %user_id, "User bound to peer");
        Ok(())
    }

    pub async fn join(&self, peer_id: &str, channel_id: &str) -> Result<bool, RelayError> {
        let mut state = self.state.write().await;
        let RelayState { registry, index } = &mut *state;
        index.join(registry, peer_id, channel_id)
    }

    pub async fn leave(&self, peer_id: &str, channel_id: &str) -> bool {
        let mut state = self.state.write().await;
        let RelayState { registry, index } = &mut *state;
        index.leave(registry, peer_id, channel_id)
    }

    pub async fn lookup(&self, peer_id: &str) -> Option<PeerConnection> {
        self.state.read().await.registry.lookup(peer_id).cloned()
    }

    pub async fn members_of(&self, channel_id: &str) -> BTreeSet<String> {
        self.state.read().await.index.members_of(channel_id)
    }

    /// Live handles of the channel's members, resolved in one read.
    pub async fn recipients(&self, channel_id: &str) -> Vec<(String, Arc<PeerHandle>)> {
        let state = self.state.read().await;
        state
            .index
            .members_of(channel_id)
            .into_iter()
            .filter_map(|peer_id| {
                let handle = state.registry.lookup(&peer_id)?.handle.clone();
                handle.is_alive().then_some((peer_id, handle))
            })
            .collect()
    }

    pub async fn peer_count(&self) -> usize {
        self.state.read().await.registry.peer_count()
    }

    pub async fn is_consistent(&self) -> bool {
        self.state.read().await.is_consistent()
    }
}
