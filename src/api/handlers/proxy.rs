//! Request forwarding handler
//!
//! The catch-all `/api/{service}/...` route: resolve the service, decide
//! whether the route is public, authenticate if it is not, then proxy the
//! request upstream. A failed auth check returns 401 before any upstream
//! network call is made.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::{Path, State};
use axum::http::{HeaderValue, Request};
use axum::response::Response;
use tracing::debug;

use crate::auth::{authenticate, JwtConfig};
use crate::error::GatewayError;
use crate::proxy::ServiceClient;
use crate::routing::ServiceRegistry;

/// Identity headers injected for authenticated requests. Inbound values are
/// always stripped so clients cannot spoof them.
pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Shared state for the forwarding handler
#[derive(Clone)]
pub struct GatewayState {
    pub registry: Arc<ServiceRegistry>,
    pub client: Arc<ServiceClient>,
    pub jwt_config: JwtConfig,
}

/// Forward `/api/{service}{path}` to the registered upstream
pub async fn forward_to_service(
    State(state): State<GatewayState>,
    Path(tail): Path<String>,
    request: Request<Body>,
) -> Result<Response, GatewayError> {
    // `tail` is everything after `/api/`; the first segment names the service
    let (service_name, rest) = match tail.split_once('/') {
        Some((service, rest)) => (service.to_string(), format!("/{rest}")),
        None => (tail, "/".to_string()),
    };

    let route = state
        .registry
        .get(&service_name)
        .ok_or_else(|| GatewayError::UnknownService(service_name.clone()))?;

    let method = request.method().clone();
    // Policy matching uses the path only; the query string is forwarded but
    // never matched against templates
    let public = route.policy.is_public(&method, &rest);

    let mut headers = request.headers().clone();
    headers.remove(USER_ID_HEADER);
    headers.remove(USER_EMAIL_HEADER);
    headers.remove(USER_ROLE_HEADER);

    if !public {
        let user = authenticate(&headers, &state.jwt_config)?;
        debug!(service = %service_name, user_id = %user.user_id, "Authenticated request");
        if let Ok(value) = HeaderValue::from_str(&user.user_id) {
            headers.insert(USER_ID_HEADER, value);
        }
        if let Ok(value) = HeaderValue::from_str(&user.email) {
            headers.insert(USER_EMAIL_HEADER, value);
        }
        if let Ok(value) = HeaderValue::from_str(&user.role) {
            headers.insert(USER_ROLE_HEADER, value);
        }
    }

    let target_url = match request.uri().query() {
        Some(query) => format!("{}{}?{}", route.base_url, rest, query),
        None => format!("{}{}", route.base_url, rest),
    };

    let body = to_bytes(request.into_body(), usize::MAX)
        .await
        .map_err(GatewayError::Body)?;

    metrics::counter!(
        "gateway_forwarded_total",
        "service" => service_name.clone(),
        "public" => if public { "true" } else { "false" }
    )
    .increment(1);

    let response = state
        .client
        .forward(&service_name, &target_url, method, headers, body)
        .await?;

    Ok(response)
}
