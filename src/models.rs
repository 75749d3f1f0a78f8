//! Domain models for the song request library. These stay light-weight data
//! holders; the store and draw engine own the behaviour that mutates them.

use std::fmt;

use chrono::NaiveDate;

use crate::error::{LibraryError, Result};

/// Text used wherever a record has no `last_played` date yet, both on screen
/// and inside the persisted table.
pub const NEVER_PLAYED: &str = "never played";

/// Date format shared by the persisted table, the CLI and playlist headers.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Draw category. Source spreadsheets use the labels `男` and `女`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Canonical label as it appears in source data and the persisted table.
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "男",
            Gender::Female => "女",
        }
    }

    /// Parse a category label. Accepts the canonical labels plus a handful of
    /// English aliases, ignoring case and surrounding whitespace.
    pub fn from_label(raw: &str) -> Option<Self> {
        let value = raw.trim().to_lowercase();
        match value.as_str() {
            "男" | "male" | "m" | "boy" => Some(Gender::Male),
            "女" | "female" | "f" | "girl" => Some(Gender::Female),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
        }
    }
}

/// One song request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongRecord {
    pub requester: String,
    pub gender: Gender,
    pub title: String,
    /// Optional URL pointing to the song. Blank cells import as `None`.
    pub link: Option<String>,
    pub play_count: u32,
    /// `None` means the song has never been drawn.
    pub last_played: Option<NaiveDate>,
}

impl SongRecord {
    /// Fresh record with no play history, as produced by an import.
    pub fn new(requester: &str, gender: Gender, title: &str, link: Option<&str>) -> Self {
        Self {
            requester: requester.to_string(),
            gender,
            title: title.to_string(),
            link: normalize_link(link.unwrap_or_default()),
            play_count: 0,
            last_played: None,
        }
    }

    /// `Title - Requester`, omitting the hyphen when the requester is blank.
    pub fn display_title(&self) -> String {
        if self.requester.trim().is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, self.requester)
        }
    }

    pub fn last_played_text(&self) -> String {
        format_last_played(self.last_played)
    }
}

/// Render an optional play date, falling back to the "never played" sentinel.
pub fn format_last_played(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.format(DATE_FORMAT).to_string(),
        None => NEVER_PLAYED.to_string(),
    }
}

/// Inverse of [`format_last_played`]. Blank text also counts as never played.
pub fn parse_last_played(raw: &str) -> Option<Option<NaiveDate>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NEVER_PLAYED) {
        return Some(None);
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).ok().map(Some)
}

fn normalize_link(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// A single-field replacement applied by [`Library::update_field`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Requester(String),
    Gender(Gender),
    Title(String),
    Link(Option<String>),
    PlayCount(u32),
    LastPlayed(Option<NaiveDate>),
}

impl FieldUpdate {
    /// Field names accepted by [`FieldUpdate::parse`].
    pub const FIELD_NAMES: [&'static str; 6] = [
        "requester",
        "gender",
        "title",
        "link",
        "play_count",
        "last_played",
    ];

    /// Build an update from a field name and its textual value.
    pub fn parse(field: &str, value: &str) -> Result<Self> {
        let invalid = |field: &'static str| LibraryError::InvalidValue {
            field,
            value: value.to_string(),
        };

        match field.trim().to_lowercase().as_str() {
            "requester" => Ok(FieldUpdate::Requester(value.trim().to_string())),
            "gender" => Gender::from_label(value)
                .map(FieldUpdate::Gender)
                .ok_or_else(|| invalid("gender")),
            "title" => {
                let title = value.trim();
                if title.is_empty() {
                    Err(invalid("title"))
                } else {
                    Ok(FieldUpdate::Title(title.to_string()))
                }
            }
            "link" => Ok(FieldUpdate::Link(normalize_link(value))),
            "play_count" | "plays" => value
                .trim()
                .parse::<u32>()
                .map(FieldUpdate::PlayCount)
                .map_err(|_| invalid("play_count")),
            "last_played" => parse_last_played(value)
                .map(FieldUpdate::LastPlayed)
                .ok_or_else(|| invalid("last_played")),
            other => Err(LibraryError::UnknownField(other.to_string())),
        }
    }

    pub fn field_name(&self) -> &'static str {
        match self {
            FieldUpdate::Requester(_) => "requester",
            FieldUpdate::Gender(_) => "gender",
            FieldUpdate::Title(_) => "title",
            FieldUpdate::Link(_) => "link",
            FieldUpdate::PlayCount(_) => "play_count",
            FieldUpdate::LastPlayed(_) => "last_played",
        }
    }
}

/// Number of records per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub male: usize,
    pub female: usize,
}

impl CategoryCounts {
    pub fn for_category(&self, category: Gender) -> usize {
        match category {
            Gender::Male => self.male,
            Gender::Female => self.female,
        }
    }
}

/// The in-memory song table. A row id is a record's position in the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Library {
    records: Vec<SongRecord>,
}

impl Library {
    pub fn new(records: Vec<SongRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[SongRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&SongRecord> {
        self.records.get(row)
    }

    pub(crate) fn get_mut(&mut self, row: usize) -> Option<&mut SongRecord> {
        self.records.get_mut(row)
    }

    /// Replace exactly one field of exactly one row. Prior values are not kept.
    pub fn update_field(&mut self, row: usize, update: FieldUpdate) -> Result<()> {
        let len = self.records.len();
        let record = self
            .records
            .get_mut(row)
            .ok_or(LibraryError::RowNotFound { row, len })?;

        match update {
            FieldUpdate::Requester(value) => record.requester = value,
            FieldUpdate::Gender(value) => record.gender = value,
            FieldUpdate::Title(value) => record.title = value,
            FieldUpdate::Link(value) => record.link = value,
            FieldUpdate::PlayCount(value) => record.play_count = value,
            FieldUpdate::LastPlayed(value) => record.last_played = value,
        }
        Ok(())
    }

    /// Row ids of every record in `category`, in table order.
    pub fn pool(&self, category: Gender) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, record)| record.gender == category)
            .map(|(row, _)| row)
            .collect()
    }

    pub fn counts(&self) -> CategoryCounts {
        self.records
            .iter()
            .fold(CategoryCounts::default(), |mut counts, record| {
                match record.gender {
                    Gender::Male => counts.male += 1,
                    Gender::Female => counts.female += 1,
                }
                counts
            })
    }

    /// Row ids whose requester, title or link contain `query`, ignoring case.
    /// A blank query matches everything.
    pub fn search(&self, query: &str) -> Vec<usize> {
        let needle = query.trim().to_lowercase();
        self.records
            .iter()
            .enumerate()
            .filter(|(_, record)| {
                needle.is_empty()
                    || record.requester.to_lowercase().contains(&needle)
                    || record.title.to_lowercase().contains(&needle)
                    || record
                        .link
                        .as_deref()
                        .map(|link| link.to_lowercase().contains(&needle))
                        .unwrap_or(false)
            })
            .map(|(row, _)| row)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Library {
        Library::new(vec![
            SongRecord::new("Amy", Gender::Female, "Yellow", Some("https://x.test/y")),
            SongRecord::new("Ben", Gender::Male, "Creep", None),
            SongRecord::new("Cai", Gender::Male, "Fix You", Some("  ")),
        ])
    }

    #[test]
    fn gender_labels_accept_aliases() {
        assert_eq!(Gender::from_label(" 男 "), Some(Gender::Male));
        assert_eq!(Gender::from_label("FEMALE"), Some(Gender::Female));
        assert_eq!(Gender::from_label("f"), Some(Gender::Female));
        assert_eq!(Gender::from_label("other"), None);
    }

    #[test]
    fn blank_link_becomes_none() {
        let library = sample();
        assert_eq!(library.records()[2].link, None);
    }

    #[test]
    fn update_field_touches_only_target_row() {
        let mut library = sample();
        let before = library.clone();
        library
            .update_field(1, FieldUpdate::Title("Karma Police".into()))
            .unwrap();

        assert_eq!(library.records()[1].title, "Karma Police");
        assert_eq!(library.records()[0], before.records()[0]);
        assert_eq!(library.records()[2], before.records()[2]);
    }

    #[test]
    fn update_field_rejects_missing_row() {
        let mut library = sample();
        let before = library.clone();
        let err = library
            .update_field(9, FieldUpdate::PlayCount(3))
            .unwrap_err();
        assert!(matches!(err, LibraryError::RowNotFound { row: 9, len: 3 }));
        assert_eq!(library, before);
    }

    #[test]
    fn field_update_parsing() {
        assert_eq!(
            FieldUpdate::parse("gender", "女").unwrap(),
            FieldUpdate::Gender(Gender::Female)
        );
        assert_eq!(
            FieldUpdate::parse("link", "   ").unwrap(),
            FieldUpdate::Link(None)
        );
        assert_eq!(
            FieldUpdate::parse("last_played", "never played").unwrap(),
            FieldUpdate::LastPlayed(None)
        );
        assert_eq!(
            FieldUpdate::parse("last_played", "2024-03-05").unwrap(),
            FieldUpdate::LastPlayed(NaiveDate::from_ymd_opt(2024, 3, 5))
        );
        assert!(matches!(
            FieldUpdate::parse("play_count", "-1"),
            Err(LibraryError::InvalidValue { field: "play_count", .. })
        ));
        let err = FieldUpdate::parse("mood", "happy").unwrap_err();
        assert!(matches!(err, LibraryError::UnknownField(_)));
        assert_eq!(
            err.to_string(),
            "unknown field \"mood\", expected one of requester, gender, title, link, play_count, last_played"
        );
    }

    #[test]
    fn pool_and_counts_follow_gender() {
        let library = sample();
        assert_eq!(library.pool(Gender::Male), vec![1, 2]);
        assert_eq!(library.pool(Gender::Female), vec![0]);
        assert_eq!(
            library.counts(),
            CategoryCounts {
                male: 2,
                female: 1
            }
        );
    }

    #[test]
    fn search_matches_requester_title_and_link() {
        let library = sample();
        assert_eq!(library.search("ben"), vec![1]);
        assert_eq!(library.search("FIX"), vec![2]);
        assert_eq!(library.search("x.test"), vec![0]);
        assert_eq!(library.search(""), vec![0, 1, 2]);
    }
}
