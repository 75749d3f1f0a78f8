use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use tracing::{debug, info, warn};

use crate::error::{LibraryError, Result};
use crate::models::{format_last_played, parse_last_played, Gender, Library, SongRecord};

use super::connection::{open_for_read, open_for_write};

/// Durable home of the song table. Every save rewrites the whole table.
#[derive(Debug, Clone)]
pub struct LibraryStore {
    path: PathBuf,
}

impl LibraryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted table. Anything short of a readable, well-formed
    /// file means "no library yet" and yields `None`.
    pub fn load(&self) -> Option<Library> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no library file yet");
            return None;
        }

        match open_for_read(&self.path).and_then(|conn| read_library(&conn)) {
            Ok(library) => {
                info!(rows = library.len(), path = %self.path.display(), "loaded library");
                Some(library)
            }
            Err(err) => {
                warn!(error = %err, path = %self.path.display(), "could not load library");
                None
            }
        }
    }

    /// Overwrite the persisted table with `library`. Runs in one transaction
    /// so a failed write leaves the previous table in place.
    pub fn persist(&self, library: &Library) -> Result<()> {
        let mut conn = open_for_write(&self.path)?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM songs", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO songs (position, requester, gender, title, link, play_count, last_played)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for (position, record) in library.records().iter().enumerate() {
                stmt.execute(params![
                    position as i64,
                    record.requester,
                    record.gender.label(),
                    record.title,
                    record.link,
                    record.play_count,
                    format_last_played(record.last_played),
                ])?;
            }
        }
        tx.commit()?;

        info!(rows = library.len(), path = %self.path.display(), "persisted library");
        Ok(())
    }
}

type RawRow = (String, String, String, Option<String>, i64, String);

fn read_library(conn: &Connection) -> Result<Library> {
    let mut stmt = conn.prepare(
        "SELECT requester, gender, title, link, play_count, last_played
         FROM songs
         ORDER BY position",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })?
        .collect::<std::result::Result<Vec<RawRow>, _>>()?;

    let records = rows
        .into_iter()
        .map(record_from_row)
        .collect::<Result<Vec<_>>>()?;
    Ok(Library::new(records))
}

fn record_from_row(row: RawRow) -> Result<SongRecord> {
    let (requester, gender, title, link, play_count, last_played) = row;

    let gender = Gender::from_label(&gender).ok_or(LibraryError::InvalidValue {
        field: "gender",
        value: gender.clone(),
    })?;
    let play_count = u32::try_from(play_count).map_err(|_| LibraryError::InvalidValue {
        field: "play_count",
        value: play_count.to_string(),
    })?;
    let last_played = parse_last_played(&last_played).ok_or(LibraryError::InvalidValue {
        field: "last_played",
        value: last_played.clone(),
    })?;

    Ok(SongRecord {
        requester,
        gender,
        title,
        link: link.filter(|value| !value.trim().is_empty()),
        play_count,
        last_played,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn rows_with_bad_values_are_rejected() {
        let row: RawRow = (
            "Amy".into(),
            "robot".into(),
            "Yellow".into(),
            None,
            0,
            "never played".into(),
        );
        assert!(matches!(
            record_from_row(row),
            Err(LibraryError::InvalidValue { field: "gender", .. })
        ));

        let row: RawRow = (
            "Amy".into(),
            "女".into(),
            "Yellow".into(),
            Some("".into()),
            4,
            "2024-01-09".into(),
        );
        let record = record_from_row(row).unwrap();
        assert_eq!(record.link, None);
        assert_eq!(record.play_count, 4);
        assert_eq!(record.last_played, NaiveDate::from_ymd_opt(2024, 1, 9));
    }

    #[test]
    fn in_memory_round_trip() {
        let conn = Connection::open_in_memory().unwrap();
        crate::store::ensure_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO songs (position, requester, gender, title, link, play_count, last_played)
             VALUES (1, 'Ben', '男', 'Creep', NULL, 2, '2024-05-01'),
                    (0, 'Amy', '女', 'Yellow', 'https://x.test', 0, 'never played')",
            [],
        )
        .unwrap();

        let library = read_library(&conn).unwrap();
        assert_eq!(library.len(), 2);
        assert_eq!(library.records()[0].title, "Yellow");
        assert_eq!(library.records()[1].gender, Gender::Male);
        assert_eq!(library.records()[0].last_played, None);
    }
}
