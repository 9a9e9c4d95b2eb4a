//! Gateway error types and HTTP mapping
//!
//! Every error a request can hit before or during forwarding maps to a JSON
//! envelope `{"success": false, "error": "..."}` with the appropriate status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::proxy::ProxyError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Unknown service: {0}")]
    UnknownService(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Proxy(#[from] ProxyError),

    #[error("Failed to read request body: {0}")]
    Body(axum::Error),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownService(_) => StatusCode::NOT_FOUND,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Proxy(ProxyError::CircuitOpen { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Proxy(_) => StatusCode::BAD_GATEWAY,
            Self::Body(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            GatewayError::UnknownService("reviews".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GatewayError::Auth(AuthError::MissingToken).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GatewayError::Proxy(ProxyError::CircuitOpen {
                service: "payment".into()
            })
            .status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
