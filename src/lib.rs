//! Core library surface for SongMate, a song request manager with a weighted
//! daily draw.
//!
//! The binary wires these modules to a terminal UI and a small command line,
//! but everything that touches the song table lives here so both front ends
//! share one implementation.
pub mod cli;
pub mod config;
pub mod draw;
pub mod error;
pub mod logging;
pub mod models;
pub mod store;
pub mod ui;

/// Draw engine entry points.
pub use draw::{active_category, draw, next_day, Pick, Selection};

pub use error::LibraryError;

/// The domain types other layers manipulate.
pub use models::{FieldUpdate, Gender, Library, SongRecord};

/// Persistence and import.
pub use store::{import, read_table, ColumnMapping, LibraryStore, RawTable};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
