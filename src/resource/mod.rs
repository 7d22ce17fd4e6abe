//! Registered resources: canonical naming, paths, and the record-kind check.

mod record;

pub use record::Record;

use crate::case;
use crate::error::RegistrationError;
use crate::store::TableRef;
use regex::Regex;

/// Names must be a single URL-safe path segment, so they can never collide with
/// router syntax (`:param`, `*wildcard`, `/`).
const NAME_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9_.~-]*$";

/// A record type exposed as a REST collection. Immutable once registered.
#[derive(Clone, Debug)]
pub struct Resource {
    name: String,
    type_name: &'static str,
    base_path: String,
    item_path: String,
    table: TableRef,
}

impl Resource {
    /// Inspect `T` once and derive its name, paths, and storage table.
    pub(crate) fn describe<T: Record>(prefix: &str, db_schema: Option<&str>) -> Result<Self, RegistrationError> {
        let type_name = std::any::type_name::<T>();
        let invalid = |reason: String| RegistrationError::InvalidResourceKind {
            type_name: type_name.to_string(),
            reason,
        };

        match serde_json::to_value(T::zero_value()) {
            Ok(serde_json::Value::Object(_)) => {}
            Ok(other) => {
                return Err(invalid(format!(
                    "zero value serializes to {}, expected a JSON object",
                    json_kind(&other)
                )))
            }
            Err(e) => return Err(invalid(format!("zero value does not serialize: {}", e))),
        }

        let name = canonical_name::<T>();
        let re = Regex::new(NAME_PATTERN).map_err(|e| invalid(e.to_string()))?;
        if !re.is_match(&name) {
            return Err(invalid(format!("'{}' is not a URL-safe resource name", name)));
        }

        let base_path = base_path(prefix, &name);
        let item_path = format!("{}/:id", base_path);
        let table = TableRef {
            schema: db_schema.map(str::to_string),
            name: T::table_name()
                .map(str::to_string)
                .unwrap_or_else(|| case::kebab_to_snake(&name)),
            id_column: T::ID_FIELD.to_string(),
        };
        Ok(Resource {
            name,
            type_name,
            base_path,
            item_path,
            table,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// `/{prefix}/{name}`
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// `/{prefix}/{name}/:id`
    pub fn item_path(&self) -> &str {
        &self.item_path
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }
}

/// Override when the record provides one, otherwise the kebab-cased plural of the type identifier.
pub fn canonical_name<T: Record>() -> String {
    match T::resource_name() {
        Some(name) => name.to_string(),
        None => case::resource_name(T::type_ident()),
    }
}

/// `/` + trimmed prefix (if any) + `/` + name.
pub fn base_path(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("/{}", name)
    } else {
        format!("/{}/{}", prefix, name)
    }
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Default)]
    struct BlogPost {
        id: i64,
        title: String,
    }

    impl Record for BlogPost {
        fn zero_value() -> Self {
            Self::default()
        }
        fn id(&self) -> Option<i64> {
            Some(self.id)
        }
        fn set_id(&mut self, id: i64) {
            self.id = id;
        }
    }

    #[derive(Serialize, Deserialize, Default)]
    struct ApiKey {
        key_id: i64,
    }

    impl Record for ApiKey {
        const ID_FIELD: &'static str = "key_id";
        fn zero_value() -> Self {
            Self::default()
        }
        fn id(&self) -> Option<i64> {
            Some(self.key_id)
        }
        fn set_id(&mut self, id: i64) {
            self.key_id = id;
        }
        fn resource_name() -> Option<&'static str> {
            Some("keys")
        }
        fn table_name() -> Option<&'static str> {
            Some("api_keys")
        }
    }

    #[derive(Serialize, Deserialize, Default)]
    struct Counter(i64);

    impl Record for Counter {
        fn zero_value() -> Self {
            Self::default()
        }
        fn id(&self) -> Option<i64> {
            Some(self.0)
        }
        fn set_id(&mut self, id: i64) {
            self.0 = id;
        }
    }

    #[derive(Serialize, Deserialize, Default)]
    struct Slashed {
        id: i64,
    }

    impl Record for Slashed {
        fn zero_value() -> Self {
            Self::default()
        }
        fn id(&self) -> Option<i64> {
            Some(self.id)
        }
        fn set_id(&mut self, id: i64) {
            self.id = id;
        }
        fn resource_name() -> Option<&'static str> {
            Some("a/b")
        }
    }

    #[test]
    fn derives_name_paths_and_table() {
        let res = Resource::describe::<BlogPost>("/v1/", None).unwrap();
        assert_eq!(res.name(), "blog-posts");
        assert_eq!(res.base_path(), "/v1/blog-posts");
        assert_eq!(res.item_path(), "/v1/blog-posts/:id");
        assert_eq!(res.table().name, "blog_posts");
        assert_eq!(res.table().id_column, "id");
    }

    #[test]
    fn override_is_used_verbatim() {
        let res = Resource::describe::<ApiKey>("", Some("app")).unwrap();
        assert_eq!(res.name(), "keys");
        assert_eq!(res.base_path(), "/keys");
        assert_eq!(res.table().qualified_name(), "app.api_keys");
        assert_eq!(res.table().id_column, "key_id");
    }

    #[test]
    fn rejects_non_composite_records() {
        let err = Resource::describe::<Counter>("", None).unwrap_err();
        assert!(err.to_string().contains("a number"), "{}", err);
    }

    #[test]
    fn rejects_names_that_are_not_a_single_segment() {
        assert!(Resource::describe::<Slashed>("", None).is_err());
    }

    #[test]
    fn base_path_without_prefix() {
        assert_eq!(base_path("", "users"), "/users");
        assert_eq!(base_path("//", "users"), "/users");
        assert_eq!(base_path("api/v2", "users"), "/api/v2/users");
    }
}
