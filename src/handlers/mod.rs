//! Generic CRUD handlers, specialized per record type at registration.

mod crud;
mod pagination;

pub use crud::{create, delete, index, read, update};
pub use pagination::Page;
