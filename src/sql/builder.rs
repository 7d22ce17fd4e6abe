//! Builds parameterized SELECT, INSERT, UPDATE, DELETE for one table.
//! Values travel as a single JSONB parameter and are typed by `jsonb_populate_record`,
//! so the table's own column types drive coercion.

use crate::store::TableRef;

/// Quote identifier for PostgreSQL.
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name (schema optional).
pub fn qualified_table(table: &TableRef) -> String {
    match &table.schema {
        Some(schema) => format!("{}.{}", quoted(schema), quoted(&table.name)),
        None => quoted(&table.name),
    }
}

fn column_list(columns: &[&str]) -> String {
    columns.iter().map(|c| quoted(c)).collect::<Vec<_>>().join(", ")
}

/// Page of rows in identity order. Params: $1 limit, $2 offset.
pub fn select_page(table: &TableRef) -> String {
    format!(
        "SELECT to_jsonb(t) FROM {} AS t ORDER BY t.{} LIMIT $1 OFFSET $2",
        qualified_table(table),
        quoted(&table.id_column)
    )
}

/// One row by identity. Params: $1 id.
pub fn select_by_id(table: &TableRef) -> String {
    format!(
        "SELECT to_jsonb(t) FROM {} AS t WHERE t.{} = $1",
        qualified_table(table),
        quoted(&table.id_column)
    )
}

/// Insert the listed columns from a JSONB object. Params: $1 row object.
pub fn insert(table: &TableRef, columns: &[&str]) -> String {
    let qt = qualified_table(table);
    if columns.is_empty() {
        return format!("INSERT INTO {} AS t DEFAULT VALUES RETURNING to_jsonb(t)", qt);
    }
    let cols = column_list(columns);
    format!(
        "INSERT INTO {qt} AS t ({cols}) SELECT {cols} FROM jsonb_populate_record(NULL::{qt}, $1) RETURNING to_jsonb(t)"
    )
}

/// Assign the listed columns from a JSONB object. Params: $1 fields object, $2 id.
/// Caller must pass at least one column.
pub fn update(table: &TableRef, columns: &[&str]) -> String {
    let qt = qualified_table(table);
    let assignments = columns
        .iter()
        .map(|c| format!("{0} = p.{0}", quoted(c)))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {qt} AS t SET {assignments} FROM jsonb_populate_record(NULL::{qt}, $1) AS p WHERE t.{} = $2 RETURNING to_jsonb(t)",
        quoted(&table.id_column)
    )
}

/// Delete by identity compared as text, so any identity string is accepted. Params: $1 id.
pub fn delete(table: &TableRef) -> String {
    format!(
        "DELETE FROM {} AS t WHERE t.{}::text = $1",
        qualified_table(table),
        quoted(&table.id_column)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users(schema: Option<&str>) -> TableRef {
        TableRef {
            schema: schema.map(str::to_string),
            name: "users".into(),
            id_column: "id".into(),
        }
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quoted("name"), "\"name\"");
        assert_eq!(quoted("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(qualified_table(&users(Some("app"))), "\"app\".\"users\"");
    }

    #[test]
    fn select_statements() {
        assert_eq!(
            select_page(&users(None)),
            "SELECT to_jsonb(t) FROM \"users\" AS t ORDER BY t.\"id\" LIMIT $1 OFFSET $2"
        );
        assert_eq!(
            select_by_id(&users(Some("app"))),
            "SELECT to_jsonb(t) FROM \"app\".\"users\" AS t WHERE t.\"id\" = $1"
        );
    }

    #[test]
    fn insert_statements() {
        assert_eq!(
            insert(&users(None), &["name", "email"]),
            "INSERT INTO \"users\" AS t (\"name\", \"email\") SELECT \"name\", \"email\" FROM jsonb_populate_record(NULL::\"users\", $1) RETURNING to_jsonb(t)"
        );
        assert_eq!(
            insert(&users(None), &[]),
            "INSERT INTO \"users\" AS t DEFAULT VALUES RETURNING to_jsonb(t)"
        );
    }

    #[test]
    fn update_and_delete_statements() {
        assert_eq!(
            update(&users(None), &["name"]),
            "UPDATE \"users\" AS t SET \"name\" = p.\"name\" FROM jsonb_populate_record(NULL::\"users\", $1) AS p WHERE t.\"id\" = $2 RETURNING to_jsonb(t)"
        );
        assert_eq!(delete(&users(None)), "DELETE FROM \"users\" AS t WHERE t.\"id\"::text = $1");
    }
}
