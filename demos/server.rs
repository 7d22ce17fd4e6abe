//! Example server: ensures the database and tables exist, registers two record types, serves their CRUD routes.
//!
//! Run with `cargo run --example server`. Reads `DATABASE_URL` and the `API_*` variables (see `ApiConfig::from_env`).

use resource_sdk::{ensure_database_exists, Api, ApiConfig, HostResolver, PgStorage, Record, Resolver};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct User {
    id: i64,
    name: String,
    email: String,
}

impl Record for User {
    fn zero_value() -> Self {
        Self::default()
    }

    fn id(&self) -> Option<i64> {
        (self.id > 0).then_some(self.id)
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct BlogPost {
    id: i64,
    user_id: i64,
    title: String,
    body: String,
    published: bool,
}

impl Record for BlogPost {
    fn zero_value() -> Self {
        Self::default()
    }

    fn id(&self) -> Option<i64> {
        (self.id > 0).then_some(self.id)
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

const DDL: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (id BIGSERIAL PRIMARY KEY, name TEXT NOT NULL DEFAULT '', email TEXT NOT NULL DEFAULT '')",
    "CREATE TABLE IF NOT EXISTS blog_posts (id BIGSERIAL PRIMARY KEY, user_id BIGINT NOT NULL DEFAULT 0, title TEXT NOT NULL DEFAULT '', body TEXT NOT NULL DEFAULT '', published BOOLEAN NOT NULL DEFAULT FALSE)",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("resource_sdk=info,server=info")),
        )
        .init();

    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/resource_sdk".into());
    ensure_database_exists(&database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;
    for ddl in DDL {
        sqlx::query(ddl).execute(&pool).await?;
    }

    let config = ApiConfig::from_env()?;
    let resolver = Resolver::request_aware(HostResolver::new(config.base_url.clone()));
    let mut api = Api::with_resolver(config, resolver, Arc::new(PgStorage::new(pool)));
    api.use_middleware(|ctx, parts| {
        if let Some(agent) = parts.headers.get("user-agent").and_then(|v| v.to_str().ok()) {
            ctx.set("user_agent", agent.into());
        }
    });
    api.add_resource::<User>()?;
    api.add_resource::<BlogPost>()?;
    for resource in api.resources() {
        tracing::info!("serving {} and {}", resource.base_path(), resource.item_path());
    }

    let listener = TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, api.into_router()).await?;
    Ok(())
}
