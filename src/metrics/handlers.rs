use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::MetricsSnapshot;
use crate::shared::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetricsResponse {
    #[serde(flatten)]
    pub counters: MetricsSnapshot,
    pub peers_online: usize,
}

/// HTTP handler for relay counters
///
/// GET /metrics
#[instrument(name = "get_metrics", skip(state))]
pub async fn get_metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        counters: state.metrics.snapshot(),
        peers_online: state.relay.peer_count().await,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Envelope;
    use crate::registry::{TransportError, TransportHandle};
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use std::sync::Arc;
    use tower::ServiceExt; // for `oneshot`

    struct NullTransport;

    impl TransportHandle for NullTransport {
        fn send(&self, _envelope: &Envelope) -> Result<(), TransportError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_get_metrics_handler() {
        let app_state = AppStateBuilder::new().build();
        app_state
            .hooks
            .on_connect("a", Arc::new(NullTransport))
            .await;

        let app = Router::new()
            .route("/metrics", get(get_metrics))
            .with_state(app_state);

        let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let metrics: MetricsResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(metrics.counters.peers_registered, 1);
        assert_eq!(metrics.peers_online, 1);
    }
}
