mod server;

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use chatcast_api::AppState;
use chatcast_core::hub::MessageHub;
use chatcast_core::relay::SessionCoordinator;
use chatcast_core::upstream::{ConnectOptions, ConnectorClientFactory, LiveClientFactory};
use chatcast_core::{config::load_config, logging};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load and validate configuration (fail fast on misconfigurations)
    let config = load_config()?;

    // 2. Initialize logging
    logging::init_logging(&config.logging)?;
    info!("Chatcast relay starting...");
    info!("HTTP address: {}", config.http_address());
    info!("Upstream connector: {}", config.upstream.connector_url);

    // 3. Wire the relay: viewer hub, upstream client factory, coordinator
    let hub = MessageHub::new();

    let factory: Arc<dyn LiveClientFactory> = Arc::new(ConnectorClientFactory::new(
        config.upstream.connector_url.parse()?,
        Duration::from_secs(config.upstream.connect_timeout_seconds),
    ));

    let coordinator = Arc::new(
        SessionCoordinator::new(factory, hub.clone()).with_connect_options(ConnectOptions {
            enable_extended_gift_info: config.upstream.enable_extended_gift_info,
        }),
    );

    // 4. Build the HTTP surface
    let router = chatcast_api::create_router(
        AppState { coordinator, hub },
        config.server.static_dir.as_deref(),
    );

    // 5. Serve until a shutdown signal arrives
    server::serve(router, &config).await
}
