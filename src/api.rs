//! Registry and route synthesis: one `add_resource` call binds the full CRUD surface for a record type.

use crate::config::ApiConfig;
use crate::context::{ContextAllocator, ContextPool, Contexter};
use crate::error::{ApiError, RegistrationError};
use crate::handlers;
use crate::resolver::Resolver;
use crate::resource::{Record, Resource};
use crate::response::{self, ALLOW_COLLECTION, ALLOW_ITEM};
use crate::routes::{AxumRouter, HandlerFuture, Params, RouteHandler, Routeable};
use crate::state::{ApiState, Middleware};
use crate::store::Storage;
use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::Method;
use axum::response::Response;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::Instrument;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Operation {
    Options(&'static str),
    Index,
    Read,
    Create,
    Update,
    Delete,
}

/// Owns the registered resources, middleware chain, resolver, router and context pool.
pub struct Api {
    state: Arc<ApiState>,
    router: Box<dyn Routeable>,
    resources: Vec<Arc<Resource>>,
}

impl Api {
    /// Default router and a static resolver answering `config.base_url`.
    pub fn new(config: ApiConfig, storage: Arc<dyn Storage>) -> Self {
        let resolver = Resolver::fixed(config.base_url.clone());
        Self::with_resolver(config, resolver, storage)
    }

    /// Default router with a custom (possibly request-aware) resolver.
    pub fn with_resolver(config: ApiConfig, resolver: Resolver, storage: Arc<dyn Storage>) -> Self {
        let state = Arc::new(ApiState::new(config, resolver, storage));
        let router = AxumRouter::new().with_not_allowed(not_allowed(Arc::clone(&state)));
        Self::from_parts(state, Box::new(router))
    }

    /// Custom resolver and custom routing backend.
    pub fn with_routing(
        config: ApiConfig,
        resolver: Resolver,
        router: Box<dyn Routeable>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        let state = Arc::new(ApiState::new(config, resolver, storage));
        Self::from_parts(state, router)
    }

    fn from_parts(state: Arc<ApiState>, router: Box<dyn Routeable>) -> Self {
        Api {
            state,
            router,
            resources: Vec::new(),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.state.config
    }

    pub fn context_pool(&self) -> &Arc<ContextPool> {
        &self.state.pool
    }

    /// Replace the storage handle. Routes registered earlier use the new handle from their next request.
    pub fn set_storage(&self, storage: Arc<dyn Storage>) {
        self.state.set_storage(storage);
    }

    /// Build contexts with `allocator` instead of the default [`crate::ApiContext`].
    pub fn set_context_allocator(&self, allocator: ContextAllocator) {
        self.state.pool.set_allocator(allocator);
    }

    /// Append to the middleware chain. Applies to every route, including ones registered earlier.
    pub fn use_middleware<F>(&self, middleware: F)
    where
        F: Fn(&mut dyn Contexter, &Parts) + Send + Sync + 'static,
    {
        let middleware: Middleware = Arc::new(middleware);
        self.state.add_middleware(middleware);
    }

    /// Register `T` and bind its routes.
    ///
    /// Fails with `InvalidResourceKind` when `T` is not a composite record or its
    /// name is not a URL-safe token; treat that as fatal at startup. Registering
    /// two resources with the same name silently shadows the earlier routes.
    pub fn add_resource<T: Record>(&mut self) -> Result<&Resource, RegistrationError> {
        let resource = Arc::new(Resource::describe::<T>(
            self.state.config.trimmed_prefix(),
            self.state.config.db_schema.as_deref(),
        )?);
        tracing::info!(
            resource = %resource.name(),
            path = %resource.base_path(),
            record = resource.type_name(),
            "registering resource"
        );

        let base = resource.base_path().to_string();
        let item = resource.item_path().to_string();
        let bindings = [
            (Method::OPTIONS, &base, Operation::Options(ALLOW_COLLECTION)),
            (Method::OPTIONS, &item, Operation::Options(ALLOW_ITEM)),
            (Method::GET, &base, Operation::Index),
            (Method::GET, &item, Operation::Read),
            (Method::POST, &base, Operation::Create),
            (Method::DELETE, &item, Operation::Delete),
            (Method::PATCH, &item, Operation::Update),
        ];
        for (method, path, op) in bindings {
            let handler = bind::<T>(Arc::clone(&self.state), Arc::clone(&resource), op);
            self.router.handle(method, path, handler);
        }

        self.resources.push(resource);
        Ok(self.resources[self.resources.len() - 1].as_ref())
    }

    /// Register using an existing value purely as a type template.
    pub fn add_resource_from<T: Record>(&mut self, _template: &T) -> Result<&Resource, RegistrationError> {
        self.add_resource::<T>()
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter().map(Arc::as_ref)
    }

    /// Finish composition and return the service, with request bodies capped at `config.body_limit`.
    pub fn into_router(self) -> axum::Router {
        let limit = self.state.config.body_limit;
        self.router.into_router().layer(RequestBodyLimitLayer::new(limit))
    }
}

fn not_allowed(state: Arc<ApiState>) -> RouteHandler {
    Arc::new(move |_req: Request, _params: Params| -> HandlerFuture {
        let state = Arc::clone(&state);
        Box::pin(async move { state.error_response(&ApiError::MethodNotAllowed) })
    })
}

/// Close a binding over the record type, the resource and the registry. No per-request state.
fn bind<T: Record>(state: Arc<ApiState>, resource: Arc<Resource>, op: Operation) -> RouteHandler {
    Arc::new(move |req: Request, params: Params| -> HandlerFuture {
        let state = Arc::clone(&state);
        let resource = Arc::clone(&resource);
        Box::pin(async move { serve::<T>(&state, &resource, op, req, params).await })
    })
}

/// Context acquisition -> middleware -> handler -> context release.
async fn serve<T: Record>(
    state: &ApiState,
    resource: &Resource,
    op: Operation,
    req: Request,
    params: Params,
) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!(
        "request",
        %request_id,
        method = %req.method(),
        resource = %resource.name()
    );
    async move {
        let (parts, body) = req.into_parts();
        let mut ctx = state.pool.acquire();
        ctx.set_url_info(state.url_info(&parts));
        state.run_middlewares(&mut *ctx, &parts);

        let result = match op {
            Operation::Options(allow) => Ok(response::allow(allow)),
            Operation::Index => handlers::index::<T>(state, resource, &parts).await,
            Operation::Read => handlers::read::<T>(state, resource, &params).await,
            Operation::Create => handlers::create::<T>(state, resource, &mut *ctx, body).await,
            Operation::Update => handlers::update::<T>(state, resource, &params, body).await,
            Operation::Delete => handlers::delete(state, resource, &params).await,
        };
        // back to the pool before the response is written
        drop(ctx);

        match result {
            Ok(resp) => {
                tracing::debug!(status = %resp.status(), "handled");
                resp
            }
            Err(err) => state.error_response(&err),
        }
    }
    .instrument(span)
    .await
}
