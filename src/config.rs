//! Configuration module
//!
//! Reads gateway configuration from a TOML file
//! (default: `~/.config/platamx-gateway/config.toml`, override with
//! `PLATAMX_CONFIG`). Every section has serde defaults so a partial file is
//! enough to get a working gateway.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Default location of the config file
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("platamx-gateway")
        .join("config.toml")
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub proxy: ProxyConfig,
    /// Service registry entries keyed by the service prefix
    /// (first path segment after `/api/`)
    pub services: BTreeMap<String, ServiceConfig>,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout: 30,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (overridable via `RUST_LOG`)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// JWT verification settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Shared HMAC secret for verifying tokens issued by the auth service
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub jwt_issuer: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "super-secret-key-change-in-production".to_string()),
            jwt_expiration_hours: 24,
            jwt_issuer: "platamx".to_string(),
        }
    }
}

/// Upstream forwarding configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Per-request timeout for upstream calls, in seconds
    pub timeout_secs: u64,
    pub circuit_breaker: CircuitBreakerConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }
}

/// Circuit breaker thresholds, shared by all per-service breakers
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens
    pub failure_threshold: u32,
    /// Successes required in half-open state to close the circuit
    pub success_threshold: u32,
    /// Seconds the circuit stays open before probing the service again
    pub open_secs: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            open_secs: 60,
        }
    }
}

/// One service registry entry
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Upstream base URL, e.g. `http://localhost:4002`
    pub base_url: String,
    /// Which routes may bypass authentication. Absent means none.
    #[serde(default)]
    pub public: PublicRoutesConfig,
}

/// Public-route policy as written in the config file.
///
/// Either the keyword `"all"` / `"none"`, or a table mapping HTTP methods to
/// route templates:
///
/// ```toml
/// [services.catalog]
/// base_url = "http://localhost:4002"
/// [services.catalog.public]
/// GET = ["/products", "/products/:id", "/search"]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PublicRoutesConfig {
    Scope(PublicScope),
    PerMethod(BTreeMap<String, Vec<String>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicScope {
    All,
    None,
}

impl Default for PublicRoutesConfig {
    /// Missing policy means no routes are public (fail closed)
    fn default() -> Self {
        Self::Scope(PublicScope::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_empty_config() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.services.is_empty());
    }

    #[test]
    fn test_parse_scope_policies() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [services.auth]
            base_url = "http://localhost:4001"
            public = "all"

            [services.payment]
            base_url = "http://localhost:4003"
            public = "none"

            [services.shipping]
            base_url = "http://localhost:4004"
            "#,
        )
        .unwrap();

        assert!(matches!(
            cfg.services["auth"].public,
            PublicRoutesConfig::Scope(PublicScope::All)
        ));
        assert!(matches!(
            cfg.services["payment"].public,
            PublicRoutesConfig::Scope(PublicScope::None)
        ));
        // Absent policy defaults to none-public
        assert!(matches!(
            cfg.services["shipping"].public,
            PublicRoutesConfig::Scope(PublicScope::None)
        ));
    }

    #[test]
    fn test_parse_per_method_policy() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [services.catalog]
            base_url = "http://localhost:4002"
            [services.catalog.public]
            GET = ["/products", "/products/:id"]
            "#,
        )
        .unwrap();

        match &cfg.services["catalog"].public {
            PublicRoutesConfig::PerMethod(map) => {
                assert_eq!(map["GET"], vec!["/products", "/products/:id"]);
            }
            other => panic!("expected per-method policy, got {other:?}"),
        }
    }
}
