//! Capabilities a record type needs to be exposed as a resource.

use crate::case;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A record that can be served as a REST collection.
///
/// The engine never assumes a schema. It only needs to build a zero value,
/// read and assign the identity, and (de)serialize the whole record.
/// Serde attributes decide the wire shape; `#[serde(default)]` on the struct
/// lets bodies omit fields, which then keep their zero value.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Name of the identity field, both in JSON and in storage.
    const ID_FIELD: &'static str = "id";

    fn zero_value() -> Self;

    fn id(&self) -> Option<i64>;

    fn set_id(&mut self, id: i64);

    /// Bare identifier of the type, used to derive the canonical name.
    fn type_ident() -> &'static str {
        case::short_type_name(std::any::type_name::<Self>())
    }

    /// Name override. When `Some`, used verbatim instead of the derived plural
    /// (acronyms, irregular plurals).
    fn resource_name() -> Option<&'static str> {
        None
    }

    /// Storage table override. Defaults to the canonical name in snake_case.
    fn table_name() -> Option<&'static str> {
        None
    }
}
