use std::path::PathBuf;

use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{FieldUpdate, Gender, Library, SongRecord};

/// Form state for correcting a single song record.
#[derive(Default, Clone)]
pub(crate) struct SongForm {
    pub(crate) requester: String,
    pub(crate) gender: String,
    pub(crate) title: String,
    pub(crate) link: String,
    pub(crate) active: SongField,
    pub(crate) error: Option<String>,
}

/// Enumerates the fields within the song form to drive focus management.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) enum SongField {
    Requester,
    Gender,
    #[default]
    Title,
    Link,
}

impl SongField {
    pub(crate) const ORDER: [SongField; 4] = [
        SongField::Title,
        SongField::Requester,
        SongField::Gender,
        SongField::Link,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            SongField::Requester => "Requester",
            SongField::Gender => "Gender",
            SongField::Title => "Title",
            SongField::Link => "Link",
        }
    }
}

impl SongForm {
    /// Populate the form from an existing record.
    pub(crate) fn from_record(record: &SongRecord) -> Self {
        Self {
            requester: record.requester.clone(),
            gender: record.gender.label().to_string(),
            title: record.title.clone(),
            link: record.link.clone().unwrap_or_default(),
            active: SongField::Title,
            error: None,
        }
    }

    /// Cycle focus forward through the fields.
    pub(crate) fn next_field(&mut self) {
        self.shift_field(1);
    }

    pub(crate) fn previous_field(&mut self) {
        self.shift_field(SongField::ORDER.len() - 1);
    }

    fn shift_field(&mut self, step: usize) {
        let len = SongField::ORDER.len();
        let current = SongField::ORDER
            .iter()
            .position(|field| *field == self.active)
            .unwrap_or(0);
        self.active = SongField::ORDER[(current + step) % len];
    }

    /// The gender field only ever holds a label, so a typed key replaces it:
    /// `m`/`男` selects male and `f`/`女` selects female.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            SongField::Requester => self.requester.push(ch),
            SongField::Title => self.title.push(ch),
            SongField::Link => self.link.push(ch),
            SongField::Gender => match Gender::from_label(&ch.to_string()) {
                Some(gender) => self.gender = gender.label().to_string(),
                None => return false,
            },
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            SongField::Requester => {
                self.requester.pop();
            }
            SongField::Gender => self.gender.clear(),
            SongField::Title => {
                self.title.pop();
            }
            SongField::Link => {
                self.link.pop();
            }
        }
    }

    /// Validate the inputs and return one update per field that differs from
    /// `row` in `library`.
    pub(crate) fn changes(&self, library: &Library, row: usize) -> Result<Vec<FieldUpdate>> {
        let record = library
            .get(row)
            .ok_or_else(|| anyhow!("Song no longer exists."))?;

        if self.title.trim().is_empty() {
            return Err(anyhow!("Song title is required."));
        }
        let gender = Gender::from_label(&self.gender)
            .ok_or_else(|| anyhow!("Gender must be 男 (m) or 女 (f)."))?;

        let mut updates = Vec::new();
        let requester = self.requester.trim();
        if requester != record.requester {
            updates.push(FieldUpdate::Requester(requester.to_string()));
        }
        if gender != record.gender {
            updates.push(FieldUpdate::Gender(gender));
        }
        let title = self.title.trim();
        if title != record.title {
            updates.push(FieldUpdate::Title(title.to_string()));
        }
        let link = FieldUpdate::parse("link", &self.link)?;
        if let FieldUpdate::Link(value) = &link {
            if *value != record.link {
                updates.push(link);
            }
        }
        Ok(updates)
    }

    pub(crate) fn value(&self, field: SongField) -> &str {
        match field {
            SongField::Requester => &self.requester,
            SongField::Gender => &self.gender,
            SongField::Title => &self.title,
            SongField::Link => &self.link,
        }
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: SongField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let placeholder = match field {
            SongField::Title | SongField::Gender => "<required>",
            SongField::Requester | SongField::Link => "<optional>",
        };
        let display = if value.is_empty() {
            placeholder.to_string()
        } else {
            value.to_string()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Display width of the requested field, used to place the cursor.
    pub(crate) fn value_len(&self, field: SongField) -> usize {
        self.value(field).chars().count()
    }
}

/// Single-line input for the spreadsheet path.
#[derive(Default, Clone)]
pub(crate) struct PathForm {
    pub(crate) path: String,
    pub(crate) error: Option<String>,
}

impl PathForm {
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.path.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.path.pop();
    }

    /// Expand a leading `~/` and reject an empty path.
    pub(crate) fn parse_path(&self, home: Option<PathBuf>) -> Result<PathBuf> {
        let raw = self.path.trim().trim_matches('"');
        if raw.is_empty() {
            return Err(anyhow!("Enter the path of a spreadsheet to import."));
        }
        match (raw.strip_prefix("~/"), home) {
            (Some(rest), Some(home)) => Ok(home.join(rest)),
            _ => Ok(PathBuf::from(raw)),
        }
    }
}

/// An import that has been read and validated but not yet applied.
pub(crate) struct ConfirmImport {
    pub(crate) path: PathBuf,
    pub(crate) library: Library,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> Library {
        Library::new(vec![SongRecord::new(
            "Amy",
            Gender::Female,
            "Yellow",
            Some("https://x.test"),
        )])
    }

    #[test]
    fn unchanged_form_yields_no_updates() {
        let library = library();
        let form = SongForm::from_record(&library.records()[0]);
        assert!(form.changes(&library, 0).unwrap().is_empty());
    }

    #[test]
    fn only_edited_fields_are_reported() {
        let library = library();
        let mut form = SongForm::from_record(&library.records()[0]);
        form.title.push_str(" (live)");
        form.link.clear();
        form.active = SongField::Gender;
        assert!(form.push_char('m'));

        let updates = form.changes(&library, 0).unwrap();
        assert_eq!(
            updates,
            vec![
                FieldUpdate::Gender(Gender::Male),
                FieldUpdate::Title("Yellow (live)".to_string()),
                FieldUpdate::Link(None),
            ]
        );
    }

    #[test]
    fn blank_title_is_rejected() {
        let library = library();
        let mut form = SongForm::from_record(&library.records()[0]);
        form.title = "  ".to_string();
        assert!(form.changes(&library, 0).is_err());
    }

    #[test]
    fn focus_cycles_through_every_field() {
        let mut form = SongForm::default();
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(form.active);
            form.next_field();
        }
        assert_eq!(form.active, SongField::Title);
        assert_eq!(seen.len(), 4);
        form.previous_field();
        assert_eq!(form.active, SongField::Link);
    }

    #[test]
    fn path_form_expands_home() {
        let form = PathForm {
            path: "~/songs.xlsx".to_string(),
            error: None,
        };
        assert_eq!(
            form.parse_path(Some(PathBuf::from("/home/amy"))).unwrap(),
            PathBuf::from("/home/amy/songs.xlsx")
        );
        assert!(PathForm::default().parse_path(None).is_err());
    }
}
