//! Gateway router with Swagger UI
//!
//! Gateway-owned endpoints (`/health`, `/metrics`, `/docs`) plus the
//! catch-all `/api/{service}/...` proxy route.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{any, get},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::JwtConfig;
use crate::proxy::ServiceClient;
use crate::routing::ServiceRegistry;

use super::handlers::health::{self, ComponentHealth, HealthResponse, HealthState};
use super::handlers::metrics::{prometheus_metrics, MetricsState};
use super::handlers::proxy::{forward_to_service, GatewayState};
use super::metrics_middleware::http_metrics_middleware;
use super::request_id::request_id_middleware;

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token issued by the auth service"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation for the gateway-owned endpoints.
///
/// Proxied service routes are documented by the services themselves.
#[derive(OpenApi)]
#[openapi(
    paths(health::health_check),
    components(schemas(HealthResponse, ComponentHealth)),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Gateway health check endpoints"),
    ),
    info(
        title = "PlataMX API Gateway",
        version = "1.0.0",
        description = "Single entry point for the PlataMX marketplace services",
        license(name = "MIT"),
    )
)]
pub struct ApiDoc;

/// Create the gateway router with all routes and middleware
pub fn create_gateway_router(
    registry: Arc<ServiceRegistry>,
    client: Arc<ServiceClient>,
    jwt_config: JwtConfig,
    prometheus_handle: PrometheusHandle,
) -> Router {
    let gateway_state = GatewayState {
        registry: registry.clone(),
        client: client.clone(),
        jwt_config,
    };

    let health_state = HealthState {
        registry,
        client,
        started_at: Arc::new(Instant::now()),
    };

    let metrics_state = MetricsState {
        handle: prometheus_handle,
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        // Swagger UI
        .merge(swagger_routes)
        // Gateway-owned endpoints
        .route("/health", get(health::health_check).with_state(health_state))
        .route(
            "/metrics",
            get(prometheus_metrics).with_state(metrics_state),
        )
        // Everything under /api/ is proxied to the registered services
        .route(
            "/api/{*path}",
            any(forward_to_service).with_state(gateway_state),
        )
        // Middleware
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
