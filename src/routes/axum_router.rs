//! Default routing backend on top of `axum::Router`.

use super::{Params, RouteHandler, Routeable};
use crate::error::ApiError;
use crate::response;
use axum::extract::{FromRequestParts, Path, Request};
use axum::http::Method;
use axum::routing::{MethodFilter, MethodRouter};
use axum::Router;

/// Collects bindings and builds one `MethodRouter` per path, so a path's verbs share
/// a fallback answering unregistered verbs with 405.
#[derive(Default)]
pub struct AxumRouter {
    routes: Vec<(String, Vec<(Method, RouteHandler)>)>,
    not_allowed: Option<RouteHandler>,
}

impl AxumRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler for verbs not registered on a known path. Defaults to a plain 405 error body.
    pub fn with_not_allowed(mut self, handler: RouteHandler) -> Self {
        self.not_allowed = Some(handler);
        self
    }

    pub fn routes(&self) -> impl Iterator<Item = (&str, &Method)> {
        self.routes
            .iter()
            .flat_map(|(path, handlers)| handlers.iter().map(move |(m, _)| (path.as_str(), m)))
    }
}

async fn call(handler: RouteHandler, req: Request) -> axum::response::Response {
    let (mut parts, body) = req.into_parts();
    let params: Params = Path::<Params>::from_request_parts(&mut parts, &())
        .await
        .map(|Path(p)| p)
        .unwrap_or_default();
    handler(Request::from_parts(parts, body), params).await
}

impl Routeable for AxumRouter {
    fn handle(&mut self, method: Method, path: &str, handler: RouteHandler) {
        let idx = match self.routes.iter().position(|(p, _)| p == path) {
            Some(idx) => idx,
            None => {
                self.routes.push((path.to_string(), Vec::new()));
                self.routes.len() - 1
            }
        };
        let handlers = &mut self.routes[idx].1;
        match handlers.iter_mut().find(|(m, _)| *m == method) {
            Some(existing) => {
                tracing::warn!(%method, path, "route already bound, replacing");
                existing.1 = handler;
            }
            None => handlers.push((method, handler)),
        }
    }

    fn into_router(self: Box<Self>) -> Router {
        let mut router = Router::new();
        for (path, handlers) in self.routes {
            let mut method_router: MethodRouter = MethodRouter::new();
            // axum answers HEAD with the GET handler unless HEAD has its own endpoint
            let head_unbound = handlers.iter().any(|(m, _)| *m == Method::GET)
                && !handlers.iter().any(|(m, _)| *m == Method::HEAD);
            for (method, handler) in handlers {
                let filter = match MethodFilter::try_from(method.clone()) {
                    Ok(filter) => filter,
                    Err(_) => {
                        tracing::warn!(%method, path = %path, "unsupported method, skipping route");
                        continue;
                    }
                };
                method_router = method_router.on(filter, move |req: Request| call(handler, req));
            }
            let not_allowed = self.not_allowed.clone();
            let refuse = move |req: Request| reject(not_allowed, req);
            if head_unbound {
                method_router = method_router.on(MethodFilter::HEAD, refuse.clone());
            }
            router = router.route(&path, method_router.fallback(refuse));
        }
        router
    }
}

async fn reject(not_allowed: Option<RouteHandler>, req: Request) -> axum::response::Response {
    match not_allowed {
        Some(handler) => call(handler, req).await,
        None => {
            let err = ApiError::MethodNotAllowed;
            response::error_response(err.status(Default::default()), &err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::HandlerFuture;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn echo_id() -> RouteHandler {
        Arc::new(|_req: Request, params: Params| -> HandlerFuture {
            Box::pin(async move { params.get("id").cloned().unwrap_or_default().into_response() })
        })
    }

    fn fixed(body: &'static str) -> RouteHandler {
        Arc::new(move |_req: Request, _params: Params| -> HandlerFuture {
            Box::pin(async move { body.into_response() })
        })
    }

    #[tokio::test]
    async fn extracts_named_params() {
        let mut router = AxumRouter::new();
        router.handle(Method::GET, "/users/:id", echo_id());
        let app = Box::new(router).into_router();
        let resp = app
            .oneshot(axum::http::Request::builder().uri("/users/42").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"42");
    }

    #[tokio::test]
    async fn later_binding_shadows_earlier() {
        let mut router = AxumRouter::new();
        router.handle(Method::GET, "/users", fixed("first"));
        router.handle(Method::GET, "/users", fixed("second"));
        assert_eq!(router.routes().count(), 1);
        let app = Box::new(router).into_router();
        let resp = app
            .oneshot(axum::http::Request::builder().uri("/users").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"second");
    }

    #[tokio::test]
    async fn unregistered_verb_is_405() {
        let mut router = AxumRouter::new();
        router.handle(Method::GET, "/users", fixed("ok"));
        let app = Box::new(router).into_router();
        let resp = app
            .oneshot(axum::http::Request::builder().method(Method::PUT).uri("/users").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"error":"Method Not Allowed"}"#);
    }

    #[tokio::test]
    async fn head_is_not_served_by_get() {
        let mut router = AxumRouter::new();
        router.handle(Method::GET, "/users", fixed("ok"));
        router.handle(Method::GET, "/pings", fixed("ok"));
        router.handle(Method::HEAD, "/pings", fixed(""));
        let app = Box::new(router).into_router();

        let head = |uri: &'static str| {
            axum::http::Request::builder()
                .method(Method::HEAD)
                .uri(uri)
                .body(Body::empty())
                .unwrap()
        };
        let resp = app.clone().oneshot(head("/users")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        let resp = app.oneshot(head("/pings")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
