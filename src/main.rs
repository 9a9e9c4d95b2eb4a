//!
//! PlataMX API Gateway entry point.
//! Reads configuration from TOML file (~/.config/platamx-gateway/config.toml).

use std::sync::Arc;

use std::time::Duration;

use tracing::{error, info, warn};

use platamx_gateway::auth::JwtConfig;
use platamx_gateway::proxy::ServiceClient;
use platamx_gateway::shutdown::ShutdownSignal;
use platamx_gateway::{create_gateway_router, default_config_path, AppConfig, ServiceRegistry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("PLATAMX_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level)),
                )
                .init();
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    info!("Starting PlataMX API Gateway...");

    // ── Prometheus metrics recorder (must be installed before any metrics calls) ──
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    info!("Prometheus metrics recorder installed");

    // ── Service registry (immutable, templates compiled once) ──
    let registry = match ServiceRegistry::from_config(&app_cfg.services) {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            error!("Invalid service registry configuration: {}", e);
            return Err(e.into());
        }
    };
    if registry.is_empty() {
        error!("No services configured; every /api/ request will return 404");
    }
    for route in registry.routes() {
        info!(service = %route.name, base_url = %route.base_url, "Registered upstream service");
    }

    let jwt_config = JwtConfig::from(&app_cfg.security);
    info!(
        "JWT verification configured (issuer: {}, expiration: {}h)",
        jwt_config.issuer, jwt_config.expiration_hours
    );

    let client = Arc::new(ServiceClient::new(&app_cfg.proxy));

    // ── Router & server ────────────────────────────────────────
    let router = create_gateway_router(registry, client, jwt_config, prometheus_handle);

    let shutdown = ShutdownSignal::new();
    shutdown.listen_for_os_signals();

    let addr = format!("{}:{}", app_cfg.server.host, app_cfg.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Gateway listening on http://{}", addr);
    info!("Swagger UI available at http://{}/docs/", addr);

    let server_shutdown = shutdown.clone();
    let server = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        server_shutdown.wait().await;
        info!("Gateway received shutdown signal");
    });

    // Bound the graceful drain: in-flight requests get shutdown_timeout
    // seconds before the process exits anyway
    tokio::select! {
        result = server => result?,
        _ = shutdown.expired(Duration::from_secs(app_cfg.server.shutdown_timeout)) => {
            warn!(
                "Graceful shutdown timed out after {}s; aborting in-flight requests",
                app_cfg.server.shutdown_timeout
            );
        }
    }

    info!("PlataMX API Gateway shutdown complete");
    Ok(())
}
