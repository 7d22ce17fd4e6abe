//! Router abstraction: `(method, path) -> handler` bindings with named path parameters.

mod axum_router;

pub use axum_router::AxumRouter;

use axum::extract::Request;
use axum::http::Method;
use axum::response::Response;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Named path segments of the matched route, e.g. `{"id": "42"}` for `/users/:id`.
pub type Params = HashMap<String, String>;

pub type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// A route binding. Holds no per-request state; invoked concurrently.
pub type RouteHandler = Arc<dyn Fn(Request, Params) -> HandlerFuture + Send + Sync>;

/// Pluggable routing backend.
pub trait Routeable: Send {
    /// Bind a handler. Binding the same method and path again replaces the earlier handler.
    /// Paths use `:name` for parameters.
    fn handle(&mut self, method: Method, path: &str, handler: RouteHandler);

    /// Finish registration and produce the service.
    fn into_router(self: Box<Self>) -> axum::Router;
}
