//! Upstream HTTP client
//!
//! Forwards gateway requests to the marketplace services over a pooled
//! `reqwest` client, one circuit breaker per service.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Method, Response};
use dashmap::DashMap;
use thiserror::Error;
use tracing::warn;

use crate::config::{CircuitBreakerConfig, ProxyConfig};

use super::circuit_breaker::CircuitBreaker;

/// Errors raised while forwarding a request upstream
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Service {service} is temporarily unavailable")]
    CircuitOpen { service: String },

    #[error("Upstream request to {service} failed: {source}")]
    Upstream {
        service: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to build upstream response: {0}")]
    Response(#[from] axum::http::Error),
}

/// HTTP client for forwarding requests to upstream services
pub struct ServiceClient {
    client: reqwest::Client,
    breakers: DashMap<String, Arc<CircuitBreaker>>,
    breaker_config: CircuitBreakerConfig,
}

impl ServiceClient {
    pub fn new(config: &ProxyConfig) -> Self {
        // Pooling and keep-alive tuned for many small requests to a handful
        // of upstream hosts
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            breakers: DashMap::new(),
            breaker_config: config.circuit_breaker.clone(),
        }
    }

    fn breaker_for(&self, service: &str) -> Arc<CircuitBreaker> {
        self.breakers
            .entry(service.to_string())
            .or_insert_with(|| Arc::new(CircuitBreaker::new(self.breaker_config.clone())))
            .clone()
    }

    /// Forward a request to `target_url` on behalf of `service`.
    ///
    /// Upstream 4xx/5xx statuses are proxied through untouched; only 5xx and
    /// transport errors count against the circuit breaker.
    pub async fn forward(
        &self,
        service: &str,
        target_url: &str,
        method: Method,
        mut headers: HeaderMap,
        body: Bytes,
    ) -> Result<Response<Body>, ProxyError> {
        let breaker = self.breaker_for(service);
        if !breaker.allow_request() {
            metrics::counter!("gateway_rejected_total", "service" => service.to_string(), "reason" => "circuit_open")
                .increment(1);
            return Err(ProxyError::CircuitOpen {
                service: service.to_string(),
            });
        }

        // The client sets Host and Content-Length itself
        headers.remove(header::HOST);
        headers.remove(header::CONTENT_LENGTH);

        let mut upstream_request = self
            .client
            .request(method, target_url)
            .headers(headers);
        if !body.is_empty() {
            upstream_request = upstream_request.body(body);
        }

        let start = Instant::now();
        let result = upstream_request.send().await;
        metrics::histogram!("gateway_upstream_duration_seconds", "service" => service.to_string())
            .record(start.elapsed().as_secs_f64());

        let upstream_response = match result {
            Ok(response) => response,
            Err(source) => {
                breaker.record_failure();
                metrics::counter!("gateway_upstream_errors_total", "service" => service.to_string())
                    .increment(1);
                return Err(ProxyError::Upstream {
                    service: service.to_string(),
                    source,
                });
            }
        };

        let status = upstream_response.status();
        if status.is_server_error() {
            breaker.record_failure();
        } else {
            // 4xx are client errors, not service failures
            breaker.record_success();
        }

        let mut builder = Response::builder().status(status);
        for (name, value) in upstream_response.headers() {
            // The body is re-framed below, hop-by-hop framing headers must not
            // leak through
            if name == &header::TRANSFER_ENCODING || name == &header::CONNECTION {
                continue;
            }
            builder = builder.header(name, value);
        }

        let body_bytes = upstream_response
            .bytes()
            .await
            .map_err(|source| ProxyError::Upstream {
                service: service.to_string(),
                source,
            })?;

        Ok(builder.body(Body::from(body_bytes))?)
    }

    /// Probe a service's `/health` endpoint
    pub async fn check_health(&self, base_url: &str) -> bool {
        let health_url = format!("{base_url}/health");
        match self
            .client
            .get(&health_url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!(base_url = %base_url, error = %e, "Service health check failed");
                false
            }
        }
    }
}
