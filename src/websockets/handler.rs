use async_trait::async_trait;
use axum::{
    extract::{Query, State, WebSocketUpgrade},
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::event::EventDispatcher;
use crate::lifecycle::LifecycleHooks;
use crate::shared::{AppError, AppState};

use super::messages::{ClientCommand, ServerMessage};
use super::socket::{Connection, MessageHandler, SocketWrapper};
use super::transport::ChannelTransport;

/// Applies client frames to the relay on behalf of one connection
pub struct RelayMessageHandler {
    hooks: LifecycleHooks,
    dispatcher: EventDispatcher,
    replies: mpsc::UnboundedSender<String>,
}

impl RelayMessageHandler {
    pub fn new(
        hooks: LifecycleHooks,
        dispatcher: EventDispatcher,
        replies: mpsc::UnboundedSender<String>,
    ) -> Self {
        Self {
            hooks,
            dispatcher,
            replies,
        }
    }

    fn reply(&self, message: &ServerMessage) {
        if let Ok(json) = serde_json::to_string(message) {
            let _ = self.replies.send(json);
        }
    }

    fn reply_error(&self, peer_id: &str, message: String) {
        warn!(peer_id = %peer_id, error = %message, "Rejected client frame");
        self.reply(&ServerMessage::error(message));
    }
}

#[async_trait]
impl MessageHandler for RelayMessageHandler {
    async fn handle_message(&self, peer_id: &str, message: String) {
        debug!(peer_id = %peer_id, message = %message, "Received frame");

        let command = match serde_json::from_str::<ClientCommand>(&message) {
            Ok(command) => command,
            Err(e) => {
                self.reply_error(peer_id, format!("Invalid frame: {}", e));
                return;
            }
        };

        match command {
            ClientCommand::Identify { user_id } => {
                if let Err(e) = self.hooks.bind_user(peer_id, &user_id).await {
                    self.reply_error(peer_id, e.to_string());
                }
            }
            ClientCommand::Join { channel_id } => {
                if let Err(e) = self.hooks.join_channel(peer_id, &channel_id).await {
                    self.reply_error(peer_id, e.to_string());
                }
            }
            ClientCommand::Leave { channel_id } => {
                self.hooks.leave_channel(peer_id, &channel_id).await;
            }
            command @ ClientCommand::Event { .. } => {
                let Some(event) = command.into_event(peer_id) else {
                    return;
                };
                if let Err(e) = self.dispatcher.route(event).await {
                    self.reply_error(peer_id, e.to_string());
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    #[serde(rename = "peerId")]
    pub peer_id: Option<String>,
}

/// WebSocket endpoint for relay peers
///
/// GET /ws?peerId=<id>
/// A client reconnecting under its previous peer id replaces the stale entry.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(app_state): State<AppState>,
) -> Result<Response, AppError> {
    let peer_id = match params.peer_id {
        Some(peer_id) if peer_id.trim().is_empty() => {
            return Err(AppError::BadRequest("peerId must not be empty".to_string()));
        }
        Some(peer_id) => peer_id,
        None => Uuid::new_v4().to_string(),
    };

    info!(peer_id = %peer_id, "WebSocket connection requested");

    Ok(ws.on_upgrade(move |socket| {
        handle_websocket_connection(Box::new(socket), peer_id, app_state)
    }))
}

/// Runs one peer from connect to disconnect
pub async fn handle_websocket_connection(
    socket: Box<dyn SocketWrapper>,
    peer_id: String,
    app_state: AppState,
) {
    // Outbound channel (relay -> client)
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();
    let shutdown = Arc::new(Notify::new());

    let transport = Arc::new(ChannelTransport::new(
        outbound_sender.clone(),
        Arc::clone(&shutdown),
    ));
    let connection_id = app_state.hooks.on_connect(&peer_id, transport).await;

    let welcome = ServerMessage::Welcome {
        peer_id: peer_id.clone(),
        connection_id,
    };
    if let Ok(json) = serde_json::to_string(&welcome) {
        let _ = outbound_sender.send(json);
    }

    let message_handler = Arc::new(RelayMessageHandler::new(
        app_state.hooks.clone(),
        app_state.dispatcher.clone(),
        outbound_sender,
    ));

    let connection = Connection::new(
        peer_id.clone(),
        socket,
        outbound_receiver,
        message_handler,
        shutdown,
    );

    match connection.run().await {
        Ok(()) => {
            info!(peer_id = %peer_id, connection_id = %connection_id, "WebSocket connection closed cleanly");
        }
        Err(e) => {
            warn!(
                peer_id = %peer_id,
                connection_id = %connection_id,
                error = %e,
                "WebSocket connection error"
            );
        }
    }

    app_state
        .hooks
        .on_disconnect_instance(&peer_id, connection_id)
        .await;
}
