//! Resource SDK: turn registered record types into REST CRUD endpoints backed by a relational store.
//!
//! ```ignore
//! let mut api = Api::new(ApiConfig::default().with_prefix("v1"), Arc::new(PgStorage::new(pool)));
//! api.add_resource::<User>()?;
//! axum::serve(listener, api.into_router()).await?;
//! ```

pub mod api;
pub mod case;
pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod resolver;
pub mod resource;
pub mod response;
pub mod routes;
pub mod sql;
pub mod state;
pub mod store;

pub use api::Api;
pub use config::{ApiConfig, ErrorStatus, UpdateResponse};
pub use context::{ApiContext, ContextAllocator, ContextPool, Contexter, PooledContext};
pub use error::{ApiError, ConfigError, RegistrationError, StoreError};
pub use resolver::{HostResolver, RequestAwareUrlResolver, Resolver, StaticResolver, UrlInfo, UrlResolver};
pub use resource::{Record, Resource};
pub use routes::{AxumRouter, Params, RouteHandler, Routeable};
pub use state::Middleware;
pub use store::{ensure_database_exists, MemoryStorage, PgStorage, Storage, TableRef};
