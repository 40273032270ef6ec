use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::registry::ConnectionId;

/// Emitted once per physical disconnect for consumers outside the relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceNotice {
    pub peer_id: String,
    pub user_id: Option<String>,
    pub channels: BTreeSet<String>,
    pub connection_id: ConnectionId,
    pub disconnected_at: DateTime<Utc>,
}

/// Receiver of disconnect notices
#[async_trait]
pub trait PresenceSink: Send + Sync {
    async fn peer_departed(&self, notice: PresenceNotice);
}

/// In-process presence sink backed by a broadcast channel
#[derive(Debug, Clone)]
pub struct PresenceBus {
    sender: broadcast::Sender<PresenceNotice>,
}

impl PresenceBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PresenceNotice> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl PresenceSink for PresenceBus {
    async fn peer_departed(&self, notice: PresenceNotice) {
        let peer_id = notice.peer_id.clone();
        match self.sender.send(notice) {
            Ok(receivers) => {
                debug!(peer_id = %peer_id, receivers = receivers, "Presence notice published")
            }
            Err(_) => debug!(peer_id = %peer_id, "Presence notice published with no receivers"),
        }
    }
}

/// Spawns a task that logs every departure seen on the bus
pub fn spawn_presence_logger(bus: &PresenceBus) -> JoinHandle<()> {
    let mut receiver = bus.subscribe();

    tokio::spawn(async move {
        info!("Presence subscriber started");
        loop {
            match receiver.recv().await {
                Ok(notice) => {
                    info!(
                        peer_id = %notice.peer_id,
                        user_id = ?notice.user_id,
                        channels = ?notice.channels,
                        "Peer departed"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped = skipped, "Presence subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        warn!("Presence subscriber ended - no more notices");
    })
}
