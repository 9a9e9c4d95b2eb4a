//! Request routing
//!
//! - `policy`: per-route access policies (which routes bypass authentication)
//! - `registry`: immutable service registry built once at startup

pub mod policy;
pub mod registry;

pub use policy::{AccessPolicy, PolicyError, RouteTemplate};
pub use registry::{ServiceRegistry, ServiceRoute};
