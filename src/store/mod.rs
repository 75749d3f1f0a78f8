//! Persistence and import, split across logical submodules.

mod connection;
mod import;
mod library;

pub use connection::ensure_schema;
pub use import::{import, read_table, ColumnMapping, RawTable};
pub use library::LibraryStore;
