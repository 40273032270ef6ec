use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

use super::peer::{ConnectionId, PeerConnection, PeerHandle, TransportHandle};
use crate::shared::RelayError;

/// Result of registering a peer
#[derive(Debug)]
pub struct Registration {
    pub connection_id: ConnectionId,
    /// The entry that was live under the same peer id, if any
    pub replaced: Option<PeerConnection>,
}

/// What `unregister` found
#[derive(Debug)]
pub enum Unregistered {
    Removed {
        connection_id: ConnectionId,
        user_id: Option<String>,
        channels: BTreeSet<String>,
    },
    AlreadyAbsent,
}

/// Set of live peer connections keyed by peer id.
///
/// Plain in-memory map; callers serialize access (see `relay::PeerRelay`).
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    // peer_id -> connection
    peers: HashMap<String, PeerConnection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an entry with no channels and no bound user, replacing any
    /// live entry under the same id. The replaced handle is retired.
    pub fn register(&mut self, peer_id: &str, transport: Arc<dyn TransportHandle>) -> Registration {
        let handle = Arc::new(PeerHandle::new(transport));
        let connection_id = handle.connection_id();
        let replaced = self
            .peers
            .insert(peer_id.to_string(), PeerConnection::new(peer_id.to_string(), handle));

        if let Some(previous) = &replaced {
            warn!(
                peer_id = %peer_id,
                old_connection_id = %previous.connection_id(),
                new_connection_id = %connection_id,
                "Duplicate registration, replacing stale connection"
            );
            previous.handle.retire();
        } else {
            debug!(peer_id = %peer_id, connection_id = %connection_id, "Peer registered");
        }

        Registration {
            connection_id,
            replaced,
        }
    }

    pub fn unregister(&mut self, peer_id: &str) -> Unregistered {
        match self.peers.remove(peer_id) {
            Some(peer) => {
                peer.handle.retire();
                Unregistered::Removed {
                    connection_id: peer.connection_id(),
                    user_id: peer.user_id,
                    channels: peer.channels,
                }
            }
            None => Unregistered::AlreadyAbsent,
        }
    }

    pub fn bind_user(&mut self, peer_id: &str, user_id: &str) -> Result<(), RelayError> {
        let peer = self
            .peers
            .get_mut(peer_id)
            .ok_or_else(|| RelayError::UnknownPeer(peer_id.to_string()))?;
        peer.user_id = Some(user_id.to_string());
        Ok(())
    }

    pub fn lookup(&self, peer_id: &str) -> Option<&PeerConnection> {
        self.peers.get(peer_id)
    }

    pub fn connection_id_of(&self, peer_id: &str) -> Option<ConnectionId> {
        self.peers.get(peer_id).map(|peer| peer.connection_id())
    }

    /// Mutable access to a peer's channel set, for the membership index only.
    pub(crate) fn channels_mut(&mut self, peer_id: &str) -> Option<&mut BTreeSet<String>> {
        self.peers.get_mut(peer_id).map(|peer| &mut peer.channels)
    }

    pub fn peers(&self) -> impl Iterator<Item = &PeerConnection> {
        self.peers.values()
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }
}
