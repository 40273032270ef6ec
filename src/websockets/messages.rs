use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::event::InboundEvent;

/// Frames a client sends over its socket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientCommand {
    /// Binds an application user to this connection
    #[serde(rename_all = "camelCase")]
    Identify { user_id: String },

    #[serde(rename_all = "camelCase")]
    Join { channel_id: String },

    #[serde(rename_all = "camelCase")]
    Leave { channel_id: String },

    /// Application event to route
    #[serde(rename_all = "camelCase")]
    Event {
        kind: String,
        #[serde(default)]
        channel_id: Option<String>,
        #[serde(default)]
        target_peer_id: Option<String>,
        #[serde(default)]
        user_id: Option<String>,
        #[serde(default)]
        payload: Value,
    },
}

impl ClientCommand {
    /// Builds the dispatcher event for an `EVENT` frame. The source is always
    /// the sending socket's own peer id.
    pub fn into_event(self, source_peer_id: &str) -> Option<InboundEvent> {
        match self {
            ClientCommand::Event {
                kind,
                channel_id,
                target_peer_id,
                user_id,
                payload,
            } => Some(InboundEvent {
                kind,
                source_peer_id: source_peer_id.to_string(),
                channel_id,
                target_peer_id,
                user_id,
                payload,
            }),
            _ => None,
        }
    }
}

/// Control frames the relay sends to a single client. Routed events are
/// written as bare envelopes instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    Welcome {
        peer_id: String,
        connection_id: Uuid,
    },

    Error { message: String },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_join() {
        let command: ClientCommand =
            serde_json::from_str(r#"{"type": "JOIN", "payload": {"channelId": "math-101"}}"#)
                .unwrap();

        assert_eq!(
            command,
            ClientCommand::Join {
                channel_id: "math-101".to_string()
            }
        );
    }

    #[test]
    fn test_event_frame_uses_socket_peer_as_source() {
        let command: ClientCommand = serde_json::from_value(json!({
            "type": "EVENT",
            "payload": {"kind": "object-sync", "targetPeerId": "b", "payload": {"id": 4}}
        }))
        .unwrap();

        let event = command.into_event("a").unwrap();

        assert_eq!(event.source_peer_id, "a");
        assert_eq!(event.target_peer_id.as_deref(), Some("b"));
        assert_eq!(event.channel_id, None);
        assert_eq!(event.payload, json!({"id": 4}));
    }

    #[test]
    fn test_unknown_frame_type_is_rejected() {
        let result = serde_json::from_str::<ClientCommand>(r#"{"type": "SHOUT", "payload": {}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_welcome_wire_format() {
        let connection_id = Uuid::nil();
        let value = serde_json::to_value(ServerMessage::Welcome {
            peer_id: "a".to_string(),
            connection_id,
        })
        .unwrap();

        assert_eq!(
            value,
            json!({
                "type": "WELCOME",
                "payload": {"peerId": "a", "connectionId": "00000000-0000-0000-0000-000000000000"}
            })
        );
    }
}
