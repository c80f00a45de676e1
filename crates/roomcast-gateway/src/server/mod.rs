//! Gateway server setup
//!
//! Provides the main WebSocket server configuration and routes.

mod handler;
mod state;

pub use handler::gateway_handler;
pub use state::GatewayState;

use crate::connection::ConnectionManager;
use axum::{routing::get, Router};
use roomcast_common::{AppConfig, AppError, IdentityVerifier};
use roomcast_engine::EngineContext;
use roomcast_store::{MemoryMessageStore, MemoryProfileStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/gateway", get(gateway_handler))
        .route("/health", get(health_check))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize all dependencies and create `GatewayState`
pub fn create_gateway_state(config: AppConfig) -> Result<GatewayState, AppError> {
    // Create stores
    let message_store = Arc::new(MemoryMessageStore::new());
    let profile_store = Arc::new(MemoryProfileStore::new());

    // Build the engine
    let engine = EngineContext::builder()
        .message_store(message_store)
        .profile_store(profile_store)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    // Create identity verifier
    let verifier = Arc::new(IdentityVerifier::new(
        &config.token.secret,
        config.token.expiry_secs,
    ));

    // Create connection manager
    let connection_manager = ConnectionManager::new_shared();

    Ok(GatewayState::new(
        engine,
        connection_manager,
        verifier,
        config,
    ))
}

/// Run the gateway server until shutdown is requested
///
/// On shutdown the listener stops accepting, then the engine closes the
/// registry and runs the depart sequence for every remaining session.
pub async fn run_server(app: Router, addr: SocketAddr, engine: EngineContext) -> Result<(), AppError> {
    tracing::info!("Starting gateway server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Gateway listening on ws://{}/gateway", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Server(format!("Server error: {e}")))?;

    tracing::info!("Server stopped, draining sessions");
    engine.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.gateway.port));

    let state = create_gateway_state(config)?;
    let engine = state.engine().clone();

    let app = create_app(state);

    run_server(app, addr, engine).await
}
