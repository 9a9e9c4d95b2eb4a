//! Route access policies
//!
//! Decides, per inbound `(method, path)` pair, whether a request may bypass
//! authentication before being forwarded upstream. The check is a pure
//! function of the policy and runs before any token verification, so public
//! routes stay cheap.
//!
//! Route templates use the single-segment placeholder syntax of common HTTP
//! routers (`/products/:id`). Templates are compiled to anchored patterns
//! once when the registry is built, never per request.
//!
//! Matching is deliberately strict: the path is compared exactly as received
//! after the service prefix is stripped. Query strings are never part of the
//! match, and trailing slashes are not normalized, so `/products/42/` does
//! not match `/products/:id`. Anything that matches no template requires
//! authentication.

use std::collections::HashMap;

use axum::http::Method;
use regex::Regex;
use thiserror::Error;

/// Errors raised while compiling a policy from configuration
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Invalid route template {template:?}: {source}")]
    InvalidTemplate {
        template: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid HTTP method in policy: {0:?}")]
    InvalidMethod(String),
}

/// A route template compiled to an anchored single-segment-wildcard pattern
#[derive(Debug, Clone)]
pub struct RouteTemplate {
    template: String,
    pattern: Regex,
}

impl RouteTemplate {
    /// Compile a template like `/products/:id` into a matcher.
    ///
    /// Every `:name` placeholder matches exactly one path segment (no `/`);
    /// literal segments are escaped; the pattern is anchored at both ends.
    pub fn compile(template: &str) -> Result<Self, PolicyError> {
        let mut pattern = String::from("^");
        for (i, segment) in template.split('/').enumerate() {
            if i > 0 {
                pattern.push('/');
            }
            if segment.starts_with(':') {
                pattern.push_str("[^/]+");
            } else {
                pattern.push_str(&regex::escape(segment));
            }
        }
        pattern.push('$');

        let pattern = Regex::new(&pattern).map_err(|source| PolicyError::InvalidTemplate {
            template: template.to_string(),
            source,
        })?;

        Ok(Self {
            template: template.to_string(),
            pattern,
        })
    }

    /// The template as written in the configuration
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Whether `path` matches this template.
    ///
    /// Exact string equality is checked first so literal templates never pay
    /// the regex cost.
    pub fn matches(&self, path: &str) -> bool {
        self.template == path || self.pattern.is_match(path)
    }
}

/// Which routes of a service are reachable without a bearer token
#[derive(Debug, Clone)]
pub enum AccessPolicy {
    /// Every route is public
    AllPublic,
    /// No route is public (the default)
    NonePublic,
    /// Ordered template lists per HTTP method; first match wins
    PerMethod(HashMap<Method, Vec<RouteTemplate>>),
}

impl AccessPolicy {
    /// Build a per-method policy from `(method, templates)` pairs
    pub fn per_method<'a, I, T>(entries: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = (&'a str, T)>,
        T: IntoIterator<Item = &'a str>,
    {
        let mut map = HashMap::new();
        for (method, templates) in entries {
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                .map_err(|_| PolicyError::InvalidMethod(method.to_string()))?;
            let templates = templates
                .into_iter()
                .map(RouteTemplate::compile)
                .collect::<Result<Vec<_>, _>>()?;
            map.insert(method, templates);
        }
        Ok(Self::PerMethod(map))
    }

    /// Whether `(method, path)` may bypass authentication.
    ///
    /// `path` is the request path with the service prefix already stripped
    /// and without the query string. A method with no template list, and a
    /// path matching no template, both fail closed.
    pub fn is_public(&self, method: &Method, path: &str) -> bool {
        match self {
            Self::AllPublic => true,
            Self::NonePublic => false,
            Self::PerMethod(map) => map
                .get(method)
                .is_some_and(|templates| templates.iter().any(|t| t.matches(path))),
        }
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::NonePublic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(entries: &[(&'static str, &[&'static str])]) -> AccessPolicy {
        AccessPolicy::per_method(entries.iter().map(|(m, ts)| (*m, ts.iter().copied()))).unwrap()
    }

    #[test]
    fn test_all_public_allows_everything() {
        let policy = AccessPolicy::AllPublic;
        assert!(policy.is_public(&Method::GET, "/anything"));
        assert!(policy.is_public(&Method::DELETE, "/users/42"));
    }

    #[test]
    fn test_none_public_denies_everything() {
        let policy = AccessPolicy::NonePublic;
        assert!(!policy.is_public(&Method::GET, "/products"));
        assert!(!policy.is_public(&Method::POST, "/login"));
    }

    #[test]
    fn test_default_policy_fails_closed() {
        let policy = AccessPolicy::default();
        assert!(!policy.is_public(&Method::GET, "/"));
    }

    #[test]
    fn test_placeholder_matches_one_segment() {
        let policy = policy(&[("GET", &["/products/:id"])]);

        assert!(policy.is_public(&Method::GET, "/products/42"));
        assert!(policy.is_public(&Method::GET, "/products/anillo-plata-925"));
        // A placeholder never spans more than one segment
        assert!(!policy.is_public(&Method::GET, "/products/42/reviews"));
        // Method with no template list fails closed
        assert!(!policy.is_public(&Method::POST, "/products/42"));
    }

    #[test]
    fn test_exact_match_is_anchored() {
        let policy = policy(&[("GET", &["/search"])]);

        assert!(policy.is_public(&Method::GET, "/search"));
        assert!(!policy.is_public(&Method::GET, "/searchx"));
        assert!(!policy.is_public(&Method::GET, "/pre/search"));
    }

    #[test]
    fn test_trailing_slash_is_not_normalized() {
        let policy = policy(&[("GET", &["/products/:id", "/products"])]);

        assert!(!policy.is_public(&Method::GET, "/products/42/"));
        assert!(!policy.is_public(&Method::GET, "/products/"));
    }

    #[test]
    fn test_multiple_placeholders() {
        let policy = policy(&[("GET", &["/sellers/:seller_id/products/:id"])]);

        assert!(policy.is_public(&Method::GET, "/sellers/7/products/42"));
        assert!(!policy.is_public(&Method::GET, "/sellers/7/products"));
        assert!(!policy.is_public(&Method::GET, "/sellers/7/products/42/images"));
    }

    #[test]
    fn test_literal_segments_are_escaped() {
        // Regex metacharacters in a literal template must not widen the match
        let policy = policy(&[("GET", &["/v1.0/items"])]);

        assert!(policy.is_public(&Method::GET, "/v1.0/items"));
        assert!(!policy.is_public(&Method::GET, "/v1x0/items"));
    }

    #[test]
    fn test_first_matching_template_wins() {
        // Overlapping templates: the answer is public either way, the check
        // just has to terminate at the first hit
        let policy = policy(&[("GET", &["/products/:id", "/products/featured"])]);
        assert!(policy.is_public(&Method::GET, "/products/featured"));
    }

    #[test]
    fn test_pure_function() {
        let policy = policy(&[("GET", &["/products/:id"])]);
        let a = policy.is_public(&Method::GET, "/products/42");
        let b = policy.is_public(&Method::GET, "/products/42");
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_method_is_rejected() {
        let result = AccessPolicy::per_method([("GE T", ["/products"])]);
        assert!(matches!(result, Err(PolicyError::InvalidMethod(_))));
    }

    #[test]
    fn test_methods_are_case_insensitive_in_config() {
        let policy = AccessPolicy::per_method([("get", ["/products"])]).unwrap();
        assert!(policy.is_public(&Method::GET, "/products"));
    }
}
