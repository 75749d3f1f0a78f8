use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::config::Config;
use crate::draw::{active_category, draw, next_day};
use crate::models::{FieldUpdate, Gender, Library, DATE_FORMAT};
use crate::store::{import, read_table, ColumnMapping, LibraryStore};
use crate::ui::{run_app, App};

#[derive(Parser, Debug)]
#[command(name = "songmate", version, about = "Song request library with a weighted daily draw")]
pub struct Cli {
    /// Folder holding the library, log and exported playlists
    #[arg(long, global = true, env = "SONGMATE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Runs the terminal UI when omitted
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replace the library with a spreadsheet (.xlsx, .xls, .ods or .csv)
    Import { path: PathBuf },
    /// Draw songs for the active category and record the plays
    Draw {
        /// How many songs to draw
        #[arg(short = 'n', long, default_value_t = 3)]
        count: usize,
        /// Reference date (YYYY-MM-DD) that picks the category and dates the
        /// playlist, defaults to today. Plays are always recorded as today.
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Override the category derived from the date
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,
        /// Also write the playlist to this file
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Show which category tomorrow's draw uses
    Category {
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Print the library
    List {
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,
    },
    /// Find rows by requester, title or link
    Search { query: String },
    /// Replace one field of one row
    Edit {
        /// Row id as shown by `list`
        row: usize,
        /// One of requester, gender, title, link, play_count, last_played
        field: String,
        value: String,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CategoryArg {
    Male,
    Female,
}

impl From<CategoryArg> for Gender {
    fn from(value: CategoryArg) -> Self {
        match value {
            CategoryArg::Male => Gender::Male,
            CategoryArg::Female => Gender::Female,
        }
    }
}

fn parse_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Execute the parsed command line against the store in `config`.
pub fn run(cli: Cli, config: &Config) -> Result<()> {
    let store = LibraryStore::new(config.db_path());

    match cli.command {
        None => {
            let library = store.load().unwrap_or_default();
            let mut app = App::new(store, library, config.clone());
            run_app(&mut app)?;
        }
        Some(Commands::Import { path }) => {
            let raw = read_table(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let library = import(&raw, &ColumnMapping::default())
                .with_context(|| format!("failed to import {}", path.display()))?;
            store.persist(&library).context("failed to save library")?;
            println!("Imported {} songs from {}", library.len(), path.display());
        }
        Some(Commands::Draw {
            count,
            date,
            category,
            export,
        }) => {
            let reference = date.unwrap_or_else(today);
            let category = category
                .map(Gender::from)
                .unwrap_or_else(|| active_category(reference));
            let mut library = load_existing(&store)?;

            let mut selection =
                draw(&mut library, category, count, today(), &mut rand::thread_rng())?;
            selection.playlist_day = next_day(reference);
            store.persist(&library).context("failed to save play counts")?;
            println!("{}", selection.playlist());

            if let Some(path) = export {
                selection
                    .export_playlist(&path)
                    .with_context(|| format!("failed to export to {}", path.display()))?;
                println!("Saved playlist to {}", path.display());
            }
        }
        Some(Commands::Category { date }) => {
            let date = date.unwrap_or_else(today);
            let category = active_category(date);
            let tomorrow = next_day(date);
            println!(
                "{} ({}) for {}",
                category,
                category.label(),
                tomorrow.format(DATE_FORMAT)
            );
        }
        Some(Commands::List { category }) => {
            let library = load_existing(&store)?;
            let rows: Vec<usize> = match category {
                Some(category) => library.pool(category.into()),
                None => (0..library.len()).collect(),
            };
            print_rows(&library, &rows);
        }
        Some(Commands::Search { query }) => {
            let library = load_existing(&store)?;
            let rows = library.search(&query);
            if rows.is_empty() {
                println!("No songs match {query:?}");
            } else {
                print_rows(&library, &rows);
            }
        }
        Some(Commands::Edit { row, field, value }) => {
            let mut library = load_existing(&store)?;
            let update = FieldUpdate::parse(&field, &value)?;
            let name = update.field_name();
            library.update_field(row, update)?;
            store.persist(&library).context("failed to save edit")?;
            info!(row, field = name, "edited row");
            println!("Updated {name} on row {row}");
        }
    }

    Ok(())
}

fn load_existing(store: &LibraryStore) -> Result<Library> {
    store.load().with_context(|| {
        format!(
            "no library at {}; run `songmate import <file>` first",
            store.path().display()
        )
    })
}

fn print_rows(library: &Library, rows: &[usize]) {
    for &row in rows {
        if let Some(record) = library.get(row) {
            println!(
                "{row:>4}  {}  {:>3}  {:<12}  {} — {}{}",
                record.gender.label(),
                record.play_count,
                record.last_played_text(),
                record.title,
                record.requester,
                record
                    .link
                    .as_deref()
                    .map(|link| format!("  <{link}>"))
                    .unwrap_or_default(),
            );
        }
    }
}
