//! Runtime configuration: where the library, log and exported playlists live.
//! The data directory defaults to a dot-folder in the user's home and can be
//! overridden from the command line or the `SONGMATE_DATA_DIR` variable.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use directories::BaseDirs;

use crate::models::DATE_FORMAT;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".songmate";
/// SQLite file holding the persisted song table.
const DB_FILE_NAME: &str = "library.sqlite";
/// Log file written by the tracing subscriber.
const LOG_FILE_NAME: &str = "songmate.log";
/// Sub-folder for playlists exported from the terminal UI.
const PLAYLIST_DIR_NAME: &str = "playlists";

#[derive(Debug, Clone)]
pub struct Config {
    data_dir: PathBuf,
}

impl Config {
    /// Use `data_dir` when given, otherwise `~/.songmate`.
    pub fn resolve(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Create the data directory if it does not exist yet.
    pub fn ensure_data_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir).with_context(|| {
            format!(
                "failed to create data directory {}",
                self.data_dir.display()
            )
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }

    /// Default export location for the playlist meant for `date`.
    pub fn playlist_path(&self, date: NaiveDate) -> PathBuf {
        self.data_dir
            .join(PLAYLIST_DIR_NAME)
            .join(format!("playlist-{}.txt", date.format(DATE_FORMAT)))
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}
