//! Gateway HTTP interface
//!
//! - `handlers`: health, metrics and the forwarding handler
//! - `request_id`: correlation ID middleware
//! - `metrics_middleware`: per-request Prometheus metrics
//! - `router`: gateway router with Swagger documentation

pub mod handlers;
pub mod metrics_middleware;
pub mod request_id;
pub mod router;

pub use handlers::proxy::{GatewayState, USER_EMAIL_HEADER, USER_ID_HEADER, USER_ROLE_HEADER};
pub use request_id::{RequestId, REQUEST_ID_HEADER};
pub use router::create_gateway_router;
