//! # roomcast-common
//!
//! Shared utilities including configuration, error handling, identity-token
//! verification, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{IdentityClaims, IdentityVerifier};
pub use config::{AppConfig, AppSettings, ConfigError, Environment, RoomConfig, ServerConfig, TokenConfig};
pub use error::{AppError, AppResult};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
