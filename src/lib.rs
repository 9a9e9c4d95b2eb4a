//! # PlataMX API Gateway
//!
//! Single entry point for the PlataMX marketplace microservices
//! (auth, catalog, payment, shipping, notification).
//!
//! ## Architecture
//!
//! - **routing**: service registry and per-route access policies
//! - **auth**: JWT bearer token verification
//! - **proxy**: upstream HTTP client with per-service circuit breakers
//! - **api**: axum router, health/metrics endpoints, forwarding handler
//! - **config**: TOML configuration loaded once at startup
//!
//! The gateway decides per request whether authentication is required
//! *before* it pays any authentication or upstream cost: public routes are
//! matched against precompiled route templates, everything else fails closed.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod proxy;
pub mod routing;
pub mod shutdown;

pub use config::{default_config_path, AppConfig};
pub use error::GatewayError;

// Re-export the gateway router and registry for embedding and tests
pub use api::create_gateway_router;
pub use routing::{AccessPolicy, ServiceRegistry};
