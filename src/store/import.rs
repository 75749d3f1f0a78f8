//! Spreadsheet ingestion. A file is first read into a [`RawTable`] of
//! trimmed strings, then [`import`] validates the header against a
//! [`ColumnMapping`] and builds a fresh [`Library`].

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use tracing::{debug, info};

use crate::error::{LibraryError, Result};
use crate::models::{Gender, Library, SongRecord};

/// Header row plus data rows, every cell already rendered as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Split the first row off as the header. An empty input has no header.
    pub fn from_rows(mut rows: Vec<Vec<String>>) -> Self {
        if rows.is_empty() {
            return Self::default();
        }
        let mut headers = rows.remove(0);
        if let Some(first) = headers.first_mut() {
            *first = first.trim_start_matches('\u{feff}').to_string();
        }
        Self { headers, rows }
    }
}

/// Source column names for the four imported fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub requester: String,
    pub gender: String,
    pub title: String,
    pub link: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            requester: "Requester".to_string(),
            gender: "Gender".to_string(),
            title: "Title".to_string(),
            link: "Link".to_string(),
        }
    }
}

impl ColumnMapping {
    fn columns(&self) -> [&str; 4] {
        [&self.requester, &self.gender, &self.title, &self.link]
    }
}

/// Build a new library from `raw`. Every required column must be present;
/// otherwise nothing is imported and the missing names are reported. Fully
/// blank rows are skipped, every other row needs a gender label and a title
/// and becomes one record with no play history.
pub fn import(raw: &RawTable, mapping: &ColumnMapping) -> Result<Library> {
    let find = |name: &str| {
        raw.headers
            .iter()
            .position(|header| header.trim().eq_ignore_ascii_case(name.trim()))
    };

    let positions: Vec<Option<usize>> = mapping.columns().iter().map(|&name| find(name)).collect();
    let missing: Vec<String> = mapping
        .columns()
        .iter()
        .zip(&positions)
        .filter(|(_, position)| position.is_none())
        .map(|(name, _)| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LibraryError::SchemaMismatch { missing });
    }
    let positions: Vec<usize> = positions.into_iter().flatten().collect();
    let (requester_at, gender_at, title_at, link_at) =
        (positions[0], positions[1], positions[2], positions[3]);

    let mut records = Vec::with_capacity(raw.rows.len());
    for (index, row) in raw.rows.iter().enumerate() {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            debug!(row = index + 2, "skipping blank row");
            continue;
        }

        let cell = |at: usize| row.get(at).map(|value| value.trim()).unwrap_or_default();
        let gender_raw = cell(gender_at);
        let gender = Gender::from_label(gender_raw).ok_or_else(|| LibraryError::InvalidGender {
            row: index + 2,
            value: gender_raw.to_string(),
        })?;

        let title = cell(title_at);
        if title.is_empty() {
            return Err(LibraryError::BlankTitle { row: index + 2 });
        }

        records.push(SongRecord::new(
            cell(requester_at),
            gender,
            title,
            Some(cell(link_at)),
        ));
    }

    info!(rows = records.len(), "imported library");
    Ok(Library::new(records))
}

/// Read a spreadsheet or CSV file, choosing the reader by file extension.
pub fn read_table(path: &Path) -> Result<RawTable> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => read_csv(path),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path),
        _ => Err(LibraryError::UnsupportedFormat(path.display().to_string())),
    }
}

/// First worksheet of a workbook.
fn read_workbook(path: &Path) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path)?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Ok(RawTable::default()),
    };

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();
    Ok(RawTable::from_rows(rows))
}

fn read_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let rows = reader
        .records()
        .map(|record| record.map(|record| record.iter().map(str::to_string).collect()))
        .collect::<std::result::Result<Vec<Vec<String>>, _>>()?;
    Ok(RawTable::from_rows(rows))
}

/// Numbers render without a trailing `.0` so a title like `1989` survives.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}
