//! Domain errors raised by the library store and the draw engine. Front ends
//! wrap these in `anyhow` and surface them as a status line or exit message.

use thiserror::Error;

use crate::models::{FieldUpdate, Gender};

#[derive(Error, Debug)]
pub enum LibraryError {
    /// The import file lacks one or more of the required header columns.
    #[error("missing required columns: {}", .missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    /// A row's gender cell matched neither category label.
    #[error("row {row}: unrecognised gender {value:?}")]
    InvalidGender { row: usize, value: String },

    /// A non-blank row has an empty title cell.
    #[error("row {row}: title is blank")]
    BlankTitle { row: usize },

    /// Nobody in the library belongs to the requested category.
    #[error("no songs in the {category} pool")]
    EmptyPool { category: Gender },

    #[error("row {row} does not exist (library has {len} rows)")]
    RowNotFound { row: usize, len: usize },

    #[error("invalid value {value:?} for field {field}")]
    InvalidValue { field: &'static str, value: String },

    #[error("unknown field {0:?}, expected one of {names}", names = FieldUpdate::FIELD_NAMES.join(", "))]
    UnknownField(String),

    #[error("unsupported import format: {0}")]
    UnsupportedFormat(String),

    #[error("file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("library storage failed: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("could not read spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("could not read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("weighted sampling failed: {0}")]
    Sampling(#[from] rand::distributions::WeightedError),
}

impl From<calamine::Error> for LibraryError {
    fn from(err: calamine::Error) -> Self {
        LibraryError::Spreadsheet(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
