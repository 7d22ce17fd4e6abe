//! Concurrent context pool. Contexts are created lazily and cycled, never destroyed.

use super::{ApiContext, Contexter};
use crossbeam::queue::SegQueue;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

/// Factory for new contexts when the pool has none available.
pub type ContextAllocator = Arc<dyn Fn() -> Box<dyn Contexter> + Send + Sync>;

pub struct ContextPool {
    idle: SegQueue<Box<dyn Contexter>>,
    allocator: RwLock<ContextAllocator>,
    created: AtomicUsize,
}

impl Default for ContextPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextPool {
    pub fn new() -> Self {
        Self::with_allocator(Arc::new(|| -> Box<dyn Contexter> { Box::new(ApiContext::new()) }))
    }

    pub fn with_allocator(allocator: ContextAllocator) -> Self {
        ContextPool {
            idle: SegQueue::new(),
            allocator: RwLock::new(allocator),
            created: AtomicUsize::new(0),
        }
    }

    /// Replace the factory. Idle contexts built by the previous factory are dropped.
    pub fn set_allocator(&self, allocator: ContextAllocator) {
        let mut guard = self.allocator.write().unwrap_or_else(|e| e.into_inner());
        *guard = allocator;
        while self.idle.pop().is_some() {}
    }

    /// Take an idle context (or allocate one) and reset it.
    /// The context goes back to the pool when the guard drops, on every exit path.
    pub fn acquire(self: &Arc<Self>) -> PooledContext {
        let mut ctx = match self.idle.pop() {
            Some(ctx) => ctx,
            None => {
                let allocator = self.allocator.read().unwrap_or_else(|e| e.into_inner()).clone();
                self.created.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(total = self.created(), "allocating request context");
                allocator()
            }
        };
        ctx.reset();
        PooledContext {
            ctx: Some(ctx),
            pool: Arc::clone(self),
        }
    }

    fn release(&self, ctx: Box<dyn Contexter>) {
        self.idle.push(ctx);
    }

    /// Contexts allocated over the pool's lifetime.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    pub fn idle(&self) -> usize {
        self.idle.len()
    }
}

/// Exclusive use of a pooled context. Do not stash references past the guard's lifetime.
pub struct PooledContext {
    ctx: Option<Box<dyn Contexter>>,
    pool: Arc<ContextPool>,
}

impl Deref for PooledContext {
    type Target = dyn Contexter;

    fn deref(&self) -> &Self::Target {
        // only None after drop
        self.ctx.as_deref().expect("context released")
    }
}

impl DerefMut for PooledContext {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx.as_deref_mut().expect("context released")
    }
}

impl Drop for PooledContext {
    fn drop(&mut self) {
        if let Some(ctx) = self.ctx.take() {
            self.pool.release(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn head() -> axum::http::request::Parts {
        axum::http::Request::new(()).into_parts().0
    }

    #[test]
    fn reuses_released_contexts() {
        let pool = Arc::new(ContextPool::new());
        {
            let mut ctx = pool.acquire();
            ctx.set("user", json!("alice"));
            ctx.set_url_info(crate::resolver::Resolver::fixed("http://a").for_request("", &head()));
        }
        assert_eq!(pool.idle(), 1);
        let mut ctx = pool.acquire();
        assert_eq!(pool.created(), 1);
        assert!(ctx.get("user").is_none(), "acquire must reset");
        let reused = ctx.as_any_mut().downcast_mut::<ApiContext>().expect("default context");
        assert!(reused.is_empty());
    }

    #[test]
    fn allocates_when_all_in_use() {
        let pool = Arc::new(ContextPool::new());
        let a = pool.acquire();
        let b = pool.acquire();
        assert_eq!(pool.created(), 2);
        drop(a);
        drop(b);
        assert_eq!(pool.idle(), 2);
    }

    #[derive(Default)]
    struct Tagged {
        inner: ApiContext,
        resets: usize,
    }

    impl Contexter for Tagged {
        fn reset(&mut self) {
            self.resets += 1;
            self.inner.reset();
        }
        fn set(&mut self, key: &str, value: serde_json::Value) {
            self.inner.set(key, value)
        }
        fn get(&self, key: &str) -> Option<&serde_json::Value> {
            self.inner.get(key)
        }
        fn url_info(&self) -> Option<&crate::resolver::UrlInfo> {
            self.inner.url_info()
        }
        fn set_url_info(&mut self, info: crate::resolver::UrlInfo) {
            self.inner.set_url_info(info)
        }
        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }

    #[test]
    fn custom_allocator_replaces_idle_contexts() {
        let pool = Arc::new(ContextPool::new());
        drop(pool.acquire());
        pool.set_allocator(Arc::new(|| -> Box<dyn Contexter> { Box::new(Tagged::default()) }));
        assert_eq!(pool.idle(), 0);

        let mut ctx = pool.acquire();
        let tagged = ctx.as_any_mut().downcast_mut::<Tagged>().expect("custom context");
        assert_eq!(tagged.resets, 1);
    }
}
