use std::fs;
use std::path::Path;

use rusqlite::{Connection, OpenFlags};

use crate::error::Result;

/// Open the library file for writing, creating it and its parent directory
/// when missing, and make sure the `songs` table exists.
pub(crate) fn open_for_write(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(path)?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Open an existing library file without creating anything.
pub(crate) fn open_for_read(path: &Path) -> Result<Connection> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    Ok(conn)
}

/// Create the flat `songs` table. `position` is the record's row id so a
/// reload reproduces the table order exactly.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS songs (
            position INTEGER PRIMARY KEY,
            requester TEXT NOT NULL,
            gender TEXT NOT NULL,
            title TEXT NOT NULL,
            link TEXT,
            play_count INTEGER NOT NULL DEFAULT 0 CHECK (play_count >= 0),
            last_played TEXT NOT NULL DEFAULT 'never played'
        )",
        [],
    )?;
    Ok(())
}
