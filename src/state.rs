//! Shared registry state captured by every route binding.

use crate::config::ApiConfig;
use crate::context::{ContextPool, Contexter};
use crate::error::ApiError;
use crate::resolver::{Resolver, UrlInfo};
use crate::response;
use crate::store::Storage;
use axum::http::request::Parts;
use axum::response::Response;
use std::sync::{Arc, RwLock};

/// Runs before every generated handler, in registration order.
pub type Middleware = Arc<dyn Fn(&mut dyn Contexter, &Parts) + Send + Sync>;

pub struct ApiState {
    pub config: ApiConfig,
    pub pool: Arc<ContextPool>,
    resolver: Resolver,
    /// Swappable after registration; bindings read it per request.
    storage: RwLock<Arc<dyn Storage>>,
    middlewares: RwLock<Arc<Vec<Middleware>>>,
}

impl ApiState {
    pub fn new(config: ApiConfig, resolver: Resolver, storage: Arc<dyn Storage>) -> Self {
        ApiState {
            config,
            pool: Arc::new(ContextPool::new()),
            resolver,
            storage: RwLock::new(storage),
            middlewares: RwLock::new(Arc::new(Vec::new())),
        }
    }

    pub fn storage(&self) -> Arc<dyn Storage> {
        self.storage.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set_storage(&self, storage: Arc<dyn Storage>) {
        *self.storage.write().unwrap_or_else(|e| e.into_inner()) = storage;
    }

    pub fn add_middleware(&self, middleware: Middleware) {
        let mut guard = self.middlewares.write().unwrap_or_else(|e| e.into_inner());
        Arc::make_mut(&mut guard).push(middleware);
    }

    /// Run the chain synchronously. The list is snapshotted so middleware never runs under the lock.
    pub fn run_middlewares(&self, ctx: &mut dyn Contexter, parts: &Parts) {
        let chain = self.middlewares.read().unwrap_or_else(|e| e.into_inner()).clone();
        for middleware in chain.iter() {
            middleware(ctx, parts);
        }
    }

    /// URL info for this request only. Request-aware resolvers answer per call; nothing shared is rebound.
    pub fn url_info(&self, parts: &Parts) -> UrlInfo {
        self.resolver.for_request(self.config.trimmed_prefix(), parts)
    }

    /// Single translation point from a failed request to its response.
    pub fn error_response(&self, err: &ApiError) -> Response {
        let status = err.status(self.config.error_status);
        if err.is_storage() {
            tracing::error!(error = %err, source = ?std::error::Error::source(err), %status, "storage failure");
        } else {
            tracing::warn!(error = %err, detail = ?err, %status, "request failed");
        }
        response::error_response(status, &err.to_string())
    }
}
