use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use blockverse_server::auth::JwtVerifier;
use blockverse_server::config::ServerConfig;
use blockverse_server::registry::RoomRegistry;
use blockverse_server::relay::{run_relay, RelayCommand};
use blockverse_server::ws::{router, AppState};
use tokio::sync::{mpsc, Semaphore};
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

/// Lifetime of tokens minted from the command line
const MINTED_TOKEN_TTL: Duration = Duration::from_secs(24 * 3600);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ServerConfig::load_or_default();

    // Validate configuration before starting
    config.validate().context("invalid server configuration")?;

    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(String::as_str) == Some("mint-token") {
        let user_id = args.get(2).context("usage: blockverse-server mint-token <user-id> [email]")?;
        let email = args.get(3).map(String::as_str).unwrap_or("");
        let verifier = JwtVerifier::new(config.auth_secret.as_bytes());
        let token = verifier
            .issue(user_id, email, MINTED_TOKEN_TTL)
            .context("failed to sign token")?;
        println!("{}", token);
        return Ok(());
    }

    if config.uses_dev_secret() {
        tracing::warn!("AUTH_SECRET not set, using the development secret");
    }

    let (relay_tx, relay_rx) = mpsc::channel::<RelayCommand>(config.command_capacity);

    // Spawn relay
    let registry = RoomRegistry::new(config.move_policy());
    tokio::spawn(async move {
        run_relay(relay_rx, registry).await;
    });

    let app_state = AppState {
        relay_tx,
        verifier: Arc::new(JwtVerifier::new(config.auth_secret.as_bytes())),
        outbox_capacity: config.outbox_capacity,
        max_message_bytes: config.max_message_bytes,
        connection_slots: Arc::new(Semaphore::new(config.max_connections)),
    };
    let app = router(app_state).layer(CorsLayer::permissive());

    tracing::info!("Starting blockverse server on {}", config.listen_addr);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
