//! Service registry
//!
//! Immutable table mapping a marketplace service name to its upstream
//! location and access policy. Built once at startup from the configuration
//! and passed explicitly into the router; never mutated afterwards.

use std::collections::{BTreeMap, HashMap};

use crate::config::{PublicRoutesConfig, PublicScope, ServiceConfig};

use super::policy::{AccessPolicy, PolicyError};

/// One registered upstream service
#[derive(Debug, Clone)]
pub struct ServiceRoute {
    pub name: String,
    /// Base URL without a trailing slash
    pub base_url: String,
    pub policy: AccessPolicy,
}

/// Immutable registry of all upstream services
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: HashMap<String, ServiceRoute>,
}

impl ServiceRegistry {
    /// Build the registry from configuration, compiling every route template
    pub fn from_config(services: &BTreeMap<String, ServiceConfig>) -> Result<Self, PolicyError> {
        let mut registry = HashMap::with_capacity(services.len());

        for (name, cfg) in services {
            let policy = match &cfg.public {
                PublicRoutesConfig::Scope(PublicScope::All) => AccessPolicy::AllPublic,
                PublicRoutesConfig::Scope(PublicScope::None) => AccessPolicy::NonePublic,
                PublicRoutesConfig::PerMethod(map) => AccessPolicy::per_method(
                    map.iter()
                        .map(|(m, ts)| (m.as_str(), ts.iter().map(String::as_str))),
                )?,
            };

            registry.insert(
                name.clone(),
                ServiceRoute {
                    name: name.clone(),
                    base_url: cfg.base_url.trim_end_matches('/').to_string(),
                    policy,
                },
            );
        }

        Ok(Self { services: registry })
    }

    /// Look up a service by its route prefix.
    ///
    /// A service absent from the registry has no base URL and no public
    /// routes; the forwarding handler turns that into 404.
    pub fn get(&self, name: &str) -> Option<&ServiceRoute> {
        self.services.get(name)
    }

    /// Iterate over all registered services
    pub fn routes(&self) -> impl Iterator<Item = &ServiceRoute> {
        self.services.values()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use axum::http::Method;

    fn registry_from_toml(toml: &str) -> ServiceRegistry {
        let cfg: AppConfig = toml::from_str(toml).unwrap();
        ServiceRegistry::from_config(&cfg.services).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let registry = registry_from_toml(
            r#"
            [services.catalog]
            base_url = "http://localhost:4002/"
            "#,
        );
        assert_eq!(
            registry.get("catalog").unwrap().base_url,
            "http://localhost:4002"
        );
    }

    #[test]
    fn test_unknown_service_is_absent() {
        let registry = registry_from_toml(
            r#"
            [services.catalog]
            base_url = "http://localhost:4002"
            public = "all"
            "#,
        );
        assert!(registry.get("catalog").is_some());
        assert!(registry.get("reviews").is_none());
    }

    #[test]
    fn test_policies_compile_from_config() {
        let registry = registry_from_toml(
            r#"
            [services.catalog]
            base_url = "http://localhost:4002"
            [services.catalog.public]
            GET = ["/products", "/products/:id"]
            "#,
        );
        let policy = &registry.get("catalog").unwrap().policy;
        assert!(policy.is_public(&Method::GET, "/products/42"));
        assert!(!policy.is_public(&Method::POST, "/products"));
    }

    #[test]
    fn test_invalid_method_in_config_is_an_error() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [services.catalog]
            base_url = "http://localhost:4002"
            [services.catalog.public]
            "NOT A METHOD" = ["/products"]
            "#,
        )
        .unwrap();
        assert!(ServiceRegistry::from_config(&cfg.services).is_err());
    }
}
