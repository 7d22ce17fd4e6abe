//! Base URL resolution for responses: static, or derived per request (e.g. host-based multi-tenant URLs).

use axum::http::request::Parts;
use std::sync::Arc;

pub const FORWARDED_PROTO_HEADER: &str = "X-Forwarded-Proto";
pub const FORWARDED_HOST_HEADER: &str = "X-Forwarded-Host";

/// Same base URL for every request.
pub trait UrlResolver: Send + Sync {
    fn base_url(&self) -> String;
}

/// Base URL that depends on the incoming request.
///
/// Called once per request with that request's head; the answer is owned by
/// the request, so concurrent requests never observe each other's result.
pub trait RequestAwareUrlResolver: Send + Sync {
    fn base_url_for(&self, parts: &Parts) -> String;
}

#[derive(Clone)]
pub enum Resolver {
    Static(Arc<dyn UrlResolver>),
    RequestAware(Arc<dyn RequestAwareUrlResolver>),
}

impl Resolver {
    pub fn fixed(base_url: impl Into<String>) -> Self {
        Resolver::Static(Arc::new(StaticResolver::new(base_url)))
    }

    pub fn request_aware<R: RequestAwareUrlResolver + 'static>(resolver: R) -> Self {
        Resolver::RequestAware(Arc::new(resolver))
    }

    /// Derive the URL info for one request.
    pub fn for_request(&self, prefix: &str, parts: &Parts) -> UrlInfo {
        let base_url = match self {
            Resolver::Static(r) => r.base_url(),
            Resolver::RequestAware(r) => r.base_url_for(parts),
        };
        UrlInfo {
            prefix: prefix.to_string(),
            base_url,
        }
    }
}

impl<R: UrlResolver + 'static> From<Arc<R>> for Resolver {
    fn from(r: Arc<R>) -> Self {
        Resolver::Static(r)
    }
}

/// Per-request URL information, owned by the request's context.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UrlInfo {
    prefix: String,
    base_url: String,
}

impl UrlInfo {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute (or root-relative when no base URL) link to a path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[derive(Clone, Debug)]
pub struct StaticResolver {
    base_url: String,
}

impl StaticResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        StaticResolver {
            base_url: base_url.into(),
        }
    }
}

impl UrlResolver for StaticResolver {
    fn base_url(&self) -> String {
        self.base_url.clone()
    }
}

/// Builds `scheme://host` from `X-Forwarded-Host`/`Host` and `X-Forwarded-Proto`.
/// Falls back to a fixed base URL when the request carries no host.
#[derive(Clone, Debug)]
pub struct HostResolver {
    fallback: String,
    default_scheme: String,
}

impl HostResolver {
    pub fn new(fallback: impl Into<String>) -> Self {
        HostResolver {
            fallback: fallback.into(),
            default_scheme: "http".into(),
        }
    }

    pub fn with_default_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.default_scheme = scheme.into();
        self
    }
}

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl RequestAwareUrlResolver for HostResolver {
    fn base_url_for(&self, parts: &Parts) -> String {
        let host = header_value(parts, FORWARDED_HOST_HEADER)
            .or_else(|| header_value(parts, axum::http::header::HOST.as_str()))
            .or_else(|| parts.uri.authority().map(|a| a.to_string()));
        match host {
            Some(host) => {
                let scheme = header_value(parts, FORWARDED_PROTO_HEADER)
                    .or_else(|| parts.uri.scheme_str().map(str::to_string))
                    .unwrap_or_else(|| self.default_scheme.clone());
                format!("{}://{}", scheme, host)
            }
            None => self.fallback.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(builder: axum::http::request::Builder) -> Parts {
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn static_resolver_ignores_request() {
        let resolver = Resolver::fixed("https://api.example.com");
        let p = parts(Request::builder().uri("/users").header("Host", "other.test"));
        let info = resolver.for_request("v1", &p);
        assert_eq!(info.base_url(), "https://api.example.com");
        assert_eq!(info.prefix(), "v1");
        assert_eq!(info.url_for("/v1/users/3"), "https://api.example.com/v1/users/3");
    }

    #[test]
    fn host_resolver_uses_request_headers() {
        let resolver = Resolver::request_aware(HostResolver::new("http://localhost"));
        let a = parts(Request::builder().uri("/users").header("Host", "customer1.example.com"));
        let b = parts(
            Request::builder()
                .uri("/users")
                .header("Host", "internal:8080")
                .header(FORWARDED_HOST_HEADER, "customer2.example.com")
                .header(FORWARDED_PROTO_HEADER, "https"),
        );
        assert_eq!(resolver.for_request("", &a).base_url(), "http://customer1.example.com");
        assert_eq!(resolver.for_request("", &b).base_url(), "https://customer2.example.com");
    }

    #[test]
    fn host_resolver_falls_back_without_host() {
        let resolver = HostResolver::new("http://localhost:3000");
        let p = parts(Request::builder().uri("/users"));
        assert_eq!(resolver.base_url_for(&p), "http://localhost:3000");
    }
}
