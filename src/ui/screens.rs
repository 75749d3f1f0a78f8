use chrono::NaiveDate;

use crate::draw::{active_category, next_day, Selection};
use crate::models::{Gender, Library};

/// Smallest and largest number of songs the draw screen offers.
pub(crate) const MIN_DRAW_COUNT: usize = 1;
pub(crate) const MAX_DRAW_COUNT: usize = 10;
const DEFAULT_DRAW_COUNT: usize = 3;

/// Filtered view over the whole library. Holds row ids rather than copies so
/// edits and draws show up after a [`LibraryScreen::refresh`].
pub(crate) struct LibraryScreen {
    pub(crate) rows: Vec<usize>,
    pub(crate) filter: Option<String>,
    pub(crate) selected: usize,
}

impl LibraryScreen {
    pub(crate) fn new(library: &Library) -> Self {
        let mut screen = Self {
            rows: Vec::new(),
            filter: None,
            selected: 0,
        };
        screen.refresh(library);
        screen
    }

    /// Recompute the visible rows from the current filter.
    pub(crate) fn refresh(&mut self, library: &Library) {
        self.rows = library.search(self.filter.as_deref().unwrap_or_default());
        self.ensure_in_bounds();
    }

    pub(crate) fn set_filter(&mut self, library: &Library, filter: Option<String>) {
        self.filter = filter;
        self.refresh(library);
    }

    pub(crate) fn current_row(&self) -> Option<usize> {
        self.rows.get(self.selected).copied()
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.rows.is_empty() {
            return;
        }
        let len = self.rows.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.rows.len().saturating_sub(1);
    }

    fn ensure_in_bounds(&mut self) {
        if self.rows.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.rows.len() {
            self.selected = self.rows.len() - 1;
        }
    }
}

/// State of the draw screen: the date the draw runs on, how many songs to
/// pick, and the most recent result.
pub(crate) struct DrawScreen {
    pub(crate) today: NaiveDate,
    pub(crate) count: usize,
    pub(crate) selection: Option<Selection>,
}

impl DrawScreen {
    pub(crate) fn new(today: NaiveDate) -> Self {
        Self {
            today,
            count: DEFAULT_DRAW_COUNT,
            selection: None,
        }
    }

    pub(crate) fn category(&self) -> Gender {
        active_category(self.today)
    }

    /// The day the drawn playlist is meant for.
    pub(crate) fn target_date(&self) -> NaiveDate {
        next_day(self.today)
    }

    pub(crate) fn adjust_count(&mut self, delta: isize) {
        let next = (self.count as isize + delta)
            .clamp(MIN_DRAW_COUNT as isize, MAX_DRAW_COUNT as isize);
        self.count = next as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SongRecord;

    fn library() -> Library {
        Library::new(vec![
            SongRecord::new("Amy", Gender::Female, "Yellow", None),
            SongRecord::new("Ben", Gender::Male, "Creep", None),
            SongRecord::new("Cai", Gender::Male, "Yesterday", None),
        ])
    }

    #[test]
    fn filter_narrows_rows_and_keeps_selection_in_bounds() {
        let library = library();
        let mut screen = LibraryScreen::new(&library);
        screen.select_last();
        assert_eq!(screen.current_row(), Some(2));

        screen.set_filter(&library, Some("ye".to_string()));
        assert_eq!(screen.rows, vec![0, 2]);
        assert_eq!(screen.current_row(), Some(2));

        screen.set_filter(&library, Some("creep".to_string()));
        assert_eq!(screen.current_row(), Some(1));

        screen.set_filter(&library, Some("nothing".to_string()));
        assert_eq!(screen.current_row(), None);
        assert_eq!(screen.filter.as_deref(), Some("nothing"));
    }

    #[test]
    fn selection_moves_are_clamped() {
        let library = library();
        let mut screen = LibraryScreen::new(&library);
        screen.move_selection(-5);
        assert_eq!(screen.selected, 0);
        screen.move_selection(10);
        assert_eq!(screen.selected, 2);
    }

    #[test]
    fn draw_count_stays_within_slider_range() {
        let mut screen = DrawScreen::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(screen.count, 3);
        screen.adjust_count(-10);
        assert_eq!(screen.count, MIN_DRAW_COUNT);
        screen.adjust_count(50);
        assert_eq!(screen.count, MAX_DRAW_COUNT);
        assert_eq!(screen.category(), Gender::Male);
        assert_eq!(
            screen.target_date(),
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
        );
    }
}
