use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::config::RelayConfig;
use crate::event::EventDispatcher;
use crate::lifecycle::{LifecycleHooks, PresenceBus};
use crate::metrics::RelayMetrics;
use crate::relay::PeerRelay;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub relay: PeerRelay,
    pub dispatcher: EventDispatcher,
    pub hooks: LifecycleHooks,
    pub presence_bus: PresenceBus,
    pub metrics: Arc<RelayMetrics>,
}

impl AppState {
    /// Wires the relay components together
    pub fn new(config: &RelayConfig) -> Self {
        let relay = PeerRelay::new();
        let metrics = Arc::new(RelayMetrics::new());
        let presence_bus = PresenceBus::new(config.presence_capacity);
        let dispatcher =
            EventDispatcher::new(relay.clone(), config.routing_policy(), Arc::clone(&metrics));
        let hooks = LifecycleHooks::new(
            relay.clone(),
            dispatcher.clone(),
            Arc::new(presence_bus.clone()),
            Arc::clone(&metrics),
        );

        Self {
            relay,
            dispatcher,
            hooks,
            presence_bus,
            metrics,
        }
    }
}

/// Contract violations surfaced to the caller. Delivery problems never end
/// up here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error("Unknown peer: {0}")]
    UnknownPeer(String),

    #[error("Unknown event kind: {0}")]
    UnknownKind(String),

    #[error("Event kind {0} requires a channelId")]
    MissingChannel(String),

    #[error("Event kind {0} requires a targetPeerId")]
    MissingTarget(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
