//! Per-request scratch context threaded through middleware and handlers.

mod pool;

pub use pool::{ContextAllocator, ContextPool, PooledContext};

use crate::resolver::UrlInfo;
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;

/// Mutable state for one request. Drawn from a [`ContextPool`] and reset before every use.
///
/// Implementations must drop everything request-specific in `reset`; the pool
/// hands the same object to unrelated requests.
pub trait Contexter: Send + 'static {
    fn reset(&mut self);

    fn set(&mut self, key: &str, value: Value);

    fn get(&self, key: &str) -> Option<&Value>;

    fn url_info(&self) -> Option<&UrlInfo>;

    fn set_url_info(&mut self, info: UrlInfo);

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[derive(Debug, Default)]
pub struct ApiContext {
    values: HashMap<String, Value>,
    url_info: Option<UrlInfo>,
}

impl ApiContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.url_info.is_none()
    }
}

impl Contexter for ApiContext {
    fn reset(&mut self) {
        // keeps the map's allocation
        self.values.clear();
        self.url_info = None;
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    fn url_info(&self) -> Option<&UrlInfo> {
        self.url_info.as_ref()
    }

    fn set_url_info(&mut self, info: UrlInfo) {
        self.url_info = Some(info);
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
