//! Storage contract required by the generated handlers, plus the shipped backends.

mod memory;
mod postgres;

pub use memory::MemoryStorage;
pub use postgres::{ensure_database_exists, PgStorage};

use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Where a resource's rows live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableRef {
    pub schema: Option<String>,
    pub name: String,
    pub id_column: String,
}

impl TableRef {
    pub fn qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }
}

/// Minimal CRUD contract. Rows are JSON objects keyed by field name.
///
/// Shared by every concurrently running handler; implementations own their
/// concurrency control.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Up to `limit` rows starting at `offset`, in the store's natural (identity) order.
    async fn find(&self, table: &TableRef, limit: i64, offset: i64) -> Result<Vec<Value>, StoreError>;

    async fn find_by_id(&self, table: &TableRef, id: i64) -> Result<Option<Value>, StoreError>;

    /// Persist a new row. Returns the stored row, including any assigned identity.
    async fn create(&self, table: &TableRef, row: &Map<String, Value>) -> Result<Value, StoreError>;

    /// Assign only the given fields. Returns the merged row, or None when the identity is absent.
    async fn update_fields(
        &self,
        table: &TableRef,
        id: i64,
        fields: &Map<String, Value>,
    ) -> Result<Option<Value>, StoreError>;

    /// Returns the number of rows removed.
    async fn delete_by_id(&self, table: &TableRef, id: &str) -> Result<u64, StoreError>;
}
