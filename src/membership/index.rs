use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::registry::ConnectionRegistry;
use crate::shared::RelayError;

/// Channel -> member peers, kept in lockstep with each peer's own channel set
/// in the registry.
#[derive(Debug, Default)]
pub struct ChannelMembershipIndex {
    // channel_id -> peer ids
    channels: HashMap<String, BTreeSet<String>>,
}

impl ChannelMembershipIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the peer to the channel. Returns whether membership changed.
    pub fn join(
        &mut self,
        registry: &mut ConnectionRegistry,
        peer_id: &str,
        channel_id: &str,
    ) -> Result<bool, RelayError> {
        let peer_channels = registry
            .channels_mut(peer_id)
            .ok_or_else(|| RelayError::UnknownPeer(peer_id.to_string()))?;

        if !peer_channels.insert(channel_id.to_string()) {
            return Ok(false);
        }
        self.channels
            .entry(channel_id.to_string())
            .or_default()
            .insert(peer_id.to_string());

        debug!(peer_id = %peer_id, channel_id = %channel_id, "Peer joined channel");
        Ok(true)
    }

    /// Removes the peer from the channel. Unknown peers and non-members are
    /// a no-op. Returns whether membership changed.
    pub fn leave(&mut self, registry: &mut ConnectionRegistry, peer_id: &str, channel_id: &str) -> bool {
        let removed = registry
            .channels_mut(peer_id)
            .map(|peer_channels| peer_channels.remove(channel_id))
            .unwrap_or(false);

        if removed {
            self.remove_member(channel_id, peer_id);
            debug!(peer_id = %peer_id, channel_id = %channel_id, "Peer left channel");
        }
        removed
    }

    /// Drops a peer that has already been taken out of the registry from
    /// every channel it belonged to.
    pub fn remove_peer(&mut self, peer_id: &str, channels: &BTreeSet<String>) {
        for channel_id in channels {
            self.remove_member(channel_id, peer_id);
        }
    }

    /// Snapshot of the channel's members. Unknown channels are empty.
    pub fn members_of(&self, channel_id: &str) -> BTreeSet<String> {
        self.channels.get(channel_id).cloned().unwrap_or_default()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Checks that both sides of the mapping agree.
    pub fn is_consistent_with(&self, registry: &ConnectionRegistry) -> bool {
        let forward = registry.peers().all(|peer| {
            peer.channels.iter().all(|channel_id| {
                self.channels
                    .get(channel_id)
                    .is_some_and(|members| members.contains(&peer.peer_id))
            })
        });
        let backward = self.channels.iter().all(|(channel_id, members)| {
            !members.is_empty()
                && members.iter().all(|peer_id| {
                    registry
                        .lookup(peer_id)
                        .is_some_and(|peer| peer.channels.contains(channel_id))
                })
        });
        forward && backward
    }

    fn remove_member(&mut self, channel_id: &str, peer_id: &str) {
        if let Some(members) = self.channels.get_mut(channel_id) {
            members.remove(peer_id);
            if members.is_empty() {
                self.channels.remove(channel_id);
            }
        }
    }
}
