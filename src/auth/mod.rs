//! JWT bearer authentication
//!
//! Verification only: the auth service issues tokens, the gateway checks
//! them. Private routes are authenticated before the proxy pays any upstream
//! cost; a failed check short-circuits with 401.

pub mod jwt;

use axum::http::{header, HeaderMap};
use thiserror::Error;

pub use jwt::{create_token, verify_token, Claims, JwtConfig};

/// Errors that can occur during authentication
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Missing authentication token")]
    MissingToken,

    #[error("Invalid authentication token")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,
}

/// Identity of an authenticated caller, decoded from the bearer token
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
    pub role: String,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Extract the token from a `Bearer <token>` Authorization header value
fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// Authenticate a request from its headers.
///
/// Pure header inspection plus HMAC verification; no I/O.
pub fn authenticate(headers: &HeaderMap, config: &JwtConfig) -> Result<AuthenticatedUser, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = extract_token(auth_header).ok_or(AuthError::InvalidToken)?;

    let claims = verify_token(token, config)?;
    Ok(AuthenticatedUser::from_claims(claims))
}
