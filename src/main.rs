use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use dva_core::constants::{DEFAULT_REST_ADDR, REST_ADDR_ENV};
use dva_core::{BundleBuilder, MessageReceiver, ProviderConfig, Responder, RestClient};

/// Main entry point for the DVA notification provider
///
/// Resolves configuration, starts the delayed responder and serves the REST API until Ctrl+C.
/// Queued responses are still delivered after the server stops.
///
/// # Environment Variables
/// - `DVA_PROPERTIES`: properties file (default: `./server.properties`)
/// - `DVA_CLIENT_URL`, `DVA_SERVER_DELAY_MS`, `DVA_RESPONSE_MODE`, `DVA_TEMPLATE_PATH`:
///   override the matching properties
/// - `DVA_REST_ADDR`: REST server address (default: "0.0.0.0:8080")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is missing or invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dva_run=info".parse()?)
                .add_directive("dva_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ProviderConfig::resolve(|key| std::env::var(key).ok()).map_err(|e| {
        tracing::error!("Configuration error: {}", e);
        e
    })?;
    let rest_addr = std::env::var(REST_ADDR_ENV).unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    tracing::info!(
        client_url = %config.client_url(),
        delay = ?config.delay(),
        response = config.response_mode().as_str(),
        "++ Starting DVA provider on {}",
        rest_addr
    );

    let transport = Arc::new(RestClient::new(config.client_url().clone())?);
    let (responder, worker) = Responder::spawn(
        BundleBuilder::from_config(&config),
        transport,
        config.delay(),
    );

    let app = router(AppState::new(MessageReceiver::new(responder)));

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router owned the last responder handle; the worker drains its queue and exits.
    worker.await?;
    tracing::info!("-- DVA provider stopped");

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
