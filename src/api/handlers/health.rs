//! Health check handler

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::proxy::ServiceClient;
use crate::routing::ServiceRegistry;

/// Health check state
#[derive(Clone)]
pub struct HealthState {
    pub registry: Arc<ServiceRegistry>,
    pub client: Arc<ServiceClient>,
    pub started_at: Arc<Instant>,
}

/// Gateway health response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// Reachability of every registered upstream service
    pub services: BTreeMap<String, ComponentHealth>,
}

/// Component health status
#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentHealth {
    pub status: String,
    pub latency_ms: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Gateway and all upstreams are healthy", body = HealthResponse),
        (status = 503, description = "One or more upstreams are unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let uptime = state.started_at.elapsed().as_secs();

    let mut services = BTreeMap::new();
    for route in state.registry.routes() {
        let start = Instant::now();
        let health = if state.client.check_health(&route.base_url).await {
            ComponentHealth {
                status: "ok".to_string(),
                latency_ms: Some(start.elapsed().as_millis() as u64),
            }
        } else {
            ComponentHealth {
                status: "unreachable".to_string(),
                latency_ms: None,
            }
        };
        services.insert(route.name.clone(), health);
    }

    let degraded = services.values().any(|h| h.status != "ok");
    let overall_status = if degraded { "degraded" } else { "ok" };
    let http_status = if degraded {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        http_status,
        Json(HealthResponse {
            status: overall_status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: uptime,
            services,
        }),
    )
}
