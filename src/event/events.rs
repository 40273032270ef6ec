use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Well-known event kinds
pub mod kinds {
    pub const OBJECT_SYNC: &str = "object-sync";
    pub const SIGNAL: &str = "signal";
    pub const CHAT: &str = "chat";
    pub const CODE_CHANGE: &str = "code-change";
    pub const CURSOR: &str = "cursor";
    pub const PRESENCE_JOINED: &str = "presence-joined";
    pub const PRESENCE_LEFT: &str = "presence-left";
}

/// Application event handed to the dispatcher.
///
/// Transient: the relay never stores events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    pub kind: String,
    pub source_peer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_peer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub payload: Value,
}

impl InboundEvent {
    /// Event addressed to every member of a channel
    pub fn to_channel(
        kind: impl Into<String>,
        source_peer_id: impl Into<String>,
        channel_id: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            kind: kind.into(),
            source_peer_id: source_peer_id.into(),
            channel_id: Some(channel_id.into()),
            target_peer_id: None,
            user_id: None,
            payload,
        }
    }

    /// Event addressed to a single peer
    pub fn to_peer(
        kind: impl Into<String>,
        source_peer_id: impl Into<String>,
        target_peer_id: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            kind: kind.into(),
            source_peer_id: source_peer_id.into(),
            channel_id: None,
            target_peer_id: Some(target_peer_id.into()),
            user_id: None,
            payload,
        }
    }
}

/// What each recipient receives. `payload` is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub kind: String,
    pub channel_id: Option<String>,
    pub payload: Value,
    pub user_id: Option<String>,
    pub from_peer_id: String,
}
