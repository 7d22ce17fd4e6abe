//! In-process storage ordered by identity. Used by tests and demos without a database.

use super::{Storage, TableRef};
use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

#[derive(Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, Map<String, Value>>,
}

#[derive(Default)]
pub struct MemoryStorage {
    tables: RwLock<HashMap<String, Table>>,
    failing: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every operation fails with a backend error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of rows currently stored for a table.
    pub fn len(&self, table: &TableRef) -> usize {
        self.read()
            .get(&table.qualified_name())
            .map(|t| t.rows.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, table: &TableRef) -> bool {
        self.len(table) == 0
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("storage unavailable".into()));
        }
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Table>> {
        self.tables.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Table>> {
        self.tables.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn explicit_id(row: &Map<String, Value>, id_column: &str) -> Option<i64> {
    row.get(id_column).and_then(Value::as_i64).filter(|id| *id > 0)
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn find(&self, table: &TableRef, limit: i64, offset: i64) -> Result<Vec<Value>, StoreError> {
        self.check()?;
        let tables = self.read();
        let Some(t) = tables.get(&table.qualified_name()) else {
            return Ok(Vec::new());
        };
        Ok(t.rows
            .values()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|r| Value::Object(r.clone()))
            .collect())
    }

    async fn find_by_id(&self, table: &TableRef, id: i64) -> Result<Option<Value>, StoreError> {
        self.check()?;
        Ok(self
            .read()
            .get(&table.qualified_name())
            .and_then(|t| t.rows.get(&id))
            .map(|r| Value::Object(r.clone())))
    }

    async fn create(&self, table: &TableRef, row: &Map<String, Value>) -> Result<Value, StoreError> {
        self.check()?;
        let mut tables = self.write();
        let t = tables.entry(table.qualified_name()).or_default();
        let id = match explicit_id(row, &table.id_column) {
            Some(id) if t.rows.contains_key(&id) => {
                return Err(StoreError::Backend(format!(
                    "duplicate key {}={} in {}",
                    table.id_column,
                    id,
                    table.qualified_name()
                )));
            }
            Some(id) => id,
            None => t.next_id.max(1),
        };
        t.next_id = t.next_id.max(id + 1);
        let mut stored = row.clone();
        stored.insert(table.id_column.clone(), Value::from(id));
        t.rows.insert(id, stored.clone());
        Ok(Value::Object(stored))
    }

    async fn update_fields(
        &self,
        table: &TableRef,
        id: i64,
        fields: &Map<String, Value>,
    ) -> Result<Option<Value>, StoreError> {
        self.check()?;
        let mut tables = self.write();
        let Some(row) = tables
            .get_mut(&table.qualified_name())
            .and_then(|t| t.rows.get_mut(&id))
        else {
            return Ok(None);
        };
        for (k, v) in fields {
            if *k != table.id_column {
                row.insert(k.clone(), v.clone());
            }
        }
        Ok(Some(Value::Object(row.clone())))
    }

    async fn delete_by_id(&self, table: &TableRef, id: &str) -> Result<u64, StoreError> {
        self.check()?;
        let Ok(id) = id.trim().parse::<i64>() else {
            return Ok(0);
        };
        let mut tables = self.write();
        let removed = tables
            .get_mut(&table.qualified_name())
            .and_then(|t| t.rows.remove(&id))
            .is_some();
        Ok(removed as u64)
    }
}
