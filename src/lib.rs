// Library crate for the classroom peer relay
// This file exposes the public API for the server binary and integration tests

pub mod config;
pub mod event;
pub mod lifecycle;
pub mod membership;
pub mod metrics;
pub mod registry;
pub mod relay;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use config::RelayConfig;
pub use event::{DeliveryReport, Envelope, EventDispatcher, InboundEvent, RouteStrategy, RoutingPolicy};
pub use lifecycle::{LifecycleHooks, PresenceBus, PresenceNotice, PresenceSink};
pub use registry::{ConnectionId, TransportError, TransportHandle};
pub use relay::PeerRelay;
pub use shared::{AppError, AppState, RelayError};

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Builds the HTTP router for the relay
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Classroom relay" }))
        .route("/ws", get(websockets::websocket_handler))
        .route("/metrics", get(metrics::get_metrics))
        .route(
            "/channels/:channel_id/members",
            get(membership::list_channel_members),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
