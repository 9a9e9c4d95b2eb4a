//! Upstream forwarding
//!
//! - `client`: pooled HTTP client that proxies requests to the services
//! - `circuit_breaker`: per-service failure isolation

pub mod circuit_breaker;
pub mod client;

pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use client::{ProxyError, ServiceClient};
