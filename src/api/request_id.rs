//! Request ID middleware
//!
//! Assigns a `X-Request-Id` UUID to every request, propagates it into a
//! `tracing::Span`, forwards it upstream as the correlation header, and
//! echoes it back in the response.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for the request correlation ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// New-type wrapper for the request ID, stored in request extensions.
///
/// Extract in handlers: `Extension(RequestId(id)): Extension<RequestId>`
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Middleware that assigns (or propagates) `X-Request-Id`.
///
/// 1. If the incoming request already carries `X-Request-Id`, reuse it.
/// 2. Otherwise, generate a new UUID v4 and set the header, so the proxy
///    forwards the same correlation ID upstream.
/// 3. Store the ID in request extensions and in a `tracing::Span` so every
///    log line emitted for this request carries it.
/// 4. Echo `X-Request-Id` in the response headers.
pub async fn request_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    // Make sure the header is present so it propagates to the upstream call
    if let Ok(value) = request_id.parse() {
        request.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri(),
    );

    // Instrument the future instead of holding an entered guard across the
    // await, which would leak the span into sibling tasks on this thread
    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = request_id.parse() {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
