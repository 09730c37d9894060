//! Repository implementations backed by `SQLite`.

mod sqlite_catalog;

pub use sqlite_catalog::{ImportSummary, SqliteCatalog};
