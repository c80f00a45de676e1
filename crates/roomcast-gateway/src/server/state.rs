//! Gateway state
//!
//! Application state for the gateway server.

use crate::connection::ConnectionManager;
use roomcast_common::{AppConfig, IdentityVerifier};
use roomcast_engine::EngineContext;
use std::sync::Arc;

/// Gateway application state
///
/// Holds all shared dependencies for the gateway server.
#[derive(Clone)]
pub struct GatewayState {
    /// Room engine (registry, stores, lifecycle, locks)
    engine: EngineContext,
    /// Connection manager for WebSocket connections
    connection_manager: Arc<ConnectionManager>,
    /// Identity token verifier
    verifier: Arc<IdentityVerifier>,
    /// Application configuration
    config: Arc<AppConfig>,
}

impl GatewayState {
    /// Create a new gateway state
    pub fn new(
        engine: EngineContext,
        connection_manager: Arc<ConnectionManager>,
        verifier: Arc<IdentityVerifier>,
        config: AppConfig,
    ) -> Self {
        Self {
            engine,
            connection_manager,
            verifier,
            config: Arc::new(config),
        }
    }

    /// Get the room engine
    pub fn engine(&self) -> &EngineContext {
        &self.engine
    }

    /// Get the connection manager
    pub fn connection_manager(&self) -> &ConnectionManager {
        &self.connection_manager
    }

    /// Get the identity verifier
    pub fn verifier(&self) -> &IdentityVerifier {
        &self.verifier
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("connection_manager", &self.connection_manager)
            .field("config", &"AppConfig")
            .finish()
    }
}
