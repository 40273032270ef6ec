use classroom_relay::{app, lifecycle::spawn_presence_logger, AppState, RelayConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "classroom_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting classroom relay");

    let config = RelayConfig::from_env();
    let app_state = AppState::new(&config);

    // Stand-in consumer until the CRUD layer subscribes to departures
    let _presence_logger = spawn_presence_logger(&app_state.presence_bus);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listener");
    info!(bind_addr = %config.bind_addr, "Relay listening");
    axum::serve(listener, app(app_state))
        .await
        .expect("Server error");
}
