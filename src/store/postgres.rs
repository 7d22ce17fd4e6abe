//! PostgreSQL storage over a sqlx pool.

use super::{Storage, TableRef};
use crate::error::StoreError;
use crate::sql;
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        PgStorage { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Field names of a row, excluding the identity column (assigned by the database or taken from the path).
fn data_columns<'a>(table: &TableRef, row: &'a Map<String, Value>) -> Vec<&'a str> {
    row.keys()
        .map(String::as_str)
        .filter(|k| *k != table.id_column)
        .collect()
}

#[async_trait]
impl Storage for PgStorage {
    async fn find(&self, table: &TableRef, limit: i64, offset: i64) -> Result<Vec<Value>, StoreError> {
        let sql = sql::select_page(table);
        tracing::debug!(sql = %sql, limit, offset, "query");
        let rows = sqlx::query_scalar::<_, Value>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, table: &TableRef, id: i64) -> Result<Option<Value>, StoreError> {
        let sql = sql::select_by_id(table);
        tracing::debug!(sql = %sql, id, "query");
        let row = sqlx::query_scalar::<_, Value>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create(&self, table: &TableRef, row: &Map<String, Value>) -> Result<Value, StoreError> {
        let mut columns = data_columns(table, row);
        // keep an explicit positive identity; otherwise the column default assigns one
        if row.get(&table.id_column).and_then(Value::as_i64).is_some_and(|id| id > 0) {
            columns.push(table.id_column.as_str());
        }
        let sql = sql::insert(table, &columns);
        tracing::debug!(sql = %sql, "query");
        let created = sqlx::query_scalar::<_, Value>(&sql)
            .bind(Value::Object(row.clone()))
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update_fields(
        &self,
        table: &TableRef,
        id: i64,
        fields: &Map<String, Value>,
    ) -> Result<Option<Value>, StoreError> {
        let columns = data_columns(table, fields);
        if columns.is_empty() {
            return self.find_by_id(table, id).await;
        }
        let sql = sql::update(table, &columns);
        tracing::debug!(sql = %sql, id, "query");
        let row = sqlx::query_scalar::<_, Value>(&sql)
            .bind(Value::Object(fields.clone()))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_by_id(&self, table: &TableRef, id: &str) -> Result<u64, StoreError> {
        let sql = sql::delete(table);
        tracing::debug!(sql = %sql, id, "query");
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

/// Create the database named in `database_url` if it does not exist, connecting through the `postgres` database.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), StoreError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", sql::quoted(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), StoreError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| StoreError::Backend("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_database_name() {
        let (admin, name) = parse_db_name_from_url("postgres://u:p@localhost:5432/shop?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert_eq!(name, "shop");
    }

    #[test]
    fn data_columns_skip_identity() {
        let table = TableRef {
            schema: None,
            name: "users".into(),
            id_column: "id".into(),
        };
        let row: Map<String, Value> = serde_json::from_str(r#"{"id": 0, "name": "a", "email": "b"}"#).unwrap();
        let mut cols = data_columns(&table, &row);
        cols.sort();
        assert_eq!(cols, vec!["email", "name"]);
    }
}
