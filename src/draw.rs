//! Weighted draw engine. Songs are sampled without replacement with weight
//! `1 / (play_count + 1)`, so rarely played requests surface more often while
//! every song keeps a non-zero chance.

use std::fs;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tracing::{debug, info};

use crate::error::{LibraryError, Result};
use crate::models::{Gender, Library, SongRecord, DATE_FORMAT};

/// The day after `reference`. `NaiveDate::MAX` has no successor and maps to
/// itself.
pub fn next_day(reference: NaiveDate) -> NaiveDate {
    reference.succ_opt().unwrap_or(reference)
}

/// Category for the draw following `reference`: tomorrow's day-of-month even
/// means male, odd means female.
pub fn active_category(reference: NaiveDate) -> Gender {
    // Only NaiveDate::MAX has no successor; the day after a Dec 31 is the 1st.
    let day = reference.succ_opt().map(|date| date.day()).unwrap_or(1);
    if day % 2 == 0 {
        Gender::Male
    } else {
        Gender::Female
    }
}

/// Selection weight of a song that has been played `play_count` times.
pub fn weight(play_count: u32) -> f64 {
    1.0 / (f64::from(play_count) + 1.0)
}

/// One drawn song. `record` is a snapshot taken after the draw applied its
/// update, so `play_count` already includes this pick.
#[derive(Debug, Clone, PartialEq)]
pub struct Pick {
    pub row: usize,
    pub record: SongRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub category: Gender,
    /// Date stamped as `last_played` on every pick.
    pub drawn_on: NaiveDate,
    /// Day the playlist is for, the day after `drawn_on` unless a caller
    /// drew for another reference date.
    pub playlist_day: NaiveDate,
    /// Picks in the order they were drawn.
    pub picks: Vec<Pick>,
}

impl Selection {
    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    /// Plain-text playlist: a header naming the category and the day it is
    /// for, then one numbered `title — requester` line per pick.
    pub fn playlist(&self) -> String {
        let mut lines = Vec::with_capacity(self.picks.len() + 1);
        lines.push(format!(
            "{} playlist · {}",
            self.category,
            self.playlist_day.format(DATE_FORMAT)
        ));
        for (index, pick) in self.picks.iter().enumerate() {
            lines.push(format!(
                "{}. {} — {}",
                index + 1,
                pick.record.title,
                pick.record.requester
            ));
        }
        lines.join("\n")
    }

    /// Write [`Selection::playlist`] to `path`, creating parent folders.
    pub fn export_playlist(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut text = self.playlist();
        text.push('\n');
        fs::write(path, text)?;
        info!(path = %path.display(), picks = self.picks.len(), "exported playlist");
        Ok(())
    }
}

/// Draw up to `requested` distinct songs from the `category` pool and record
/// the plays on `library` itself. The caller persists the library afterwards.
///
/// Fails with [`LibraryError::EmptyPool`] before touching anything when no
/// song matches `category`. Asking for more songs than the pool holds draws
/// the whole pool.
pub fn draw<R: Rng + ?Sized>(
    library: &mut Library,
    category: Gender,
    requested: usize,
    today: NaiveDate,
    rng: &mut R,
) -> Result<Selection> {
    let mut remaining = library.pool(category);
    if remaining.is_empty() {
        return Err(LibraryError::EmptyPool { category });
    }

    let take = requested.min(remaining.len());
    let mut weights: Vec<f64> = remaining
        .iter()
        .filter_map(|&row| library.get(row))
        .map(|record| weight(record.play_count))
        .collect();

    let mut chosen = Vec::with_capacity(take);
    while chosen.len() < take {
        let index = WeightedIndex::<f64>::new(&weights)?.sample(rng);
        chosen.push(remaining.swap_remove(index));
        weights.swap_remove(index);
    }

    let mut picks = Vec::with_capacity(chosen.len());
    for row in chosen {
        if let Some(record) = library.get_mut(row) {
            record.play_count = record.play_count.saturating_add(1);
            record.last_played = Some(today);
            debug!(row, title = %record.title, plays = record.play_count, "picked song");
            picks.push(Pick {
                row,
                record: record.clone(),
            });
        }
    }

    info!(%category, requested, picked = picks.len(), "draw complete");
    Ok(Selection {
        category,
        drawn_on: today,
        playlist_day: next_day(today),
        picks,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(requester: &str, gender: Gender, title: &str, plays: u32) -> SongRecord {
        let mut record = SongRecord::new(requester, gender, title, None);
        record.play_count = plays;
        record
    }

    fn mixed_library() -> Library {
        Library::new(vec![
            record("Ann", Gender::Male, "One", 0),
            record("Bea", Gender::Female, "Two", 2),
            record("Cal", Gender::Male, "Three", 0),
            record("Dee", Gender::Female, "Four", 2),
            record("Eli", Gender::Male, "Five", 5),
        ])
    }

    #[test]
    fn category_follows_tomorrows_day() {
        assert_eq!(active_category(date(2024, 3, 1)), Gender::Male);
        assert_eq!(active_category(date(2024, 3, 2)), Gender::Female);
        assert_eq!(active_category(date(2024, 2, 28)), Gender::Female);
        assert_eq!(active_category(date(2023, 2, 28)), Gender::Female);
        assert_eq!(active_category(date(2024, 1, 31)), Gender::Female);
        assert_eq!(active_category(date(2024, 3, 9)), Gender::Male);
        assert_eq!(active_category(NaiveDate::MAX), Gender::Female);
    }

    #[test]
    fn category_is_deterministic() {
        let day = date(2025, 7, 14);
        assert_eq!(active_category(day), active_category(day));
    }

    #[test]
    fn weights_shrink_with_play_count() {
        assert_eq!(weight(0), 1.0);
        assert!((weight(9) - 0.1).abs() < 1e-12);
        assert!(weight(u32::MAX) > 0.0);
    }

    #[test]
    fn oversized_request_draws_whole_pool() {
        let mut library = mixed_library();
        let mut rng = StdRng::seed_from_u64(7);
        let today = date(2024, 3, 1);

        let selection = draw(&mut library, Gender::Male, 5, today, &mut rng).unwrap();

        let rows: HashSet<usize> = selection.picks.iter().map(|pick| pick.row).collect();
        assert_eq!(rows, HashSet::from([0, 2, 4]));
        let counts: Vec<u32> = library.records().iter().map(|r| r.play_count).collect();
        assert_eq!(counts, vec![1, 2, 1, 2, 6]);
        assert_eq!(library.records()[1].last_played, None);
        assert_eq!(library.records()[3].last_played, None);
        assert!(selection
            .picks
            .iter()
            .all(|pick| pick.record.last_played == Some(today)));
    }

    #[test]
    fn picks_are_distinct_and_bounded() {
        for seed in 0..50 {
            let mut library = mixed_library();
            let before = library.clone();
            let mut rng = StdRng::seed_from_u64(seed);
            let selection =
                draw(&mut library, Gender::Male, 2, date(2024, 3, 1), &mut rng).unwrap();

            assert_eq!(selection.len(), 2);
            let rows: HashSet<usize> = selection.picks.iter().map(|pick| pick.row).collect();
            assert_eq!(rows.len(), 2);

            for (row, (after, prior)) in library
                .records()
                .iter()
                .zip(before.records())
                .enumerate()
            {
                if rows.contains(&row) {
                    assert_eq!(after.play_count, prior.play_count + 1);
                } else {
                    assert_eq!(after, prior);
                }
            }
        }
    }

    #[test]
    fn playlist_is_dated_for_the_drawn_category() {
        let mut library = mixed_library();
        let mut rng = StdRng::seed_from_u64(11);
        let today = date(2024, 6, 1);
        let selection = draw(&mut library, active_category(today), 1, today, &mut rng).unwrap();

        assert_eq!(selection.drawn_on, today);
        assert_eq!(selection.playlist_day, date(2024, 6, 2));
        assert!(selection
            .playlist()
            .starts_with("Male playlist · 2024-06-02\n"));
        assert_eq!(next_day(NaiveDate::MAX), NaiveDate::MAX);
    }

    #[test]
    fn picks_report_post_increment_counts() {
        let mut library = mixed_library();
        let mut rng = StdRng::seed_from_u64(3);
        let selection = draw(&mut library, Gender::Female, 1, date(2024, 3, 2), &mut rng).unwrap();
        let pick = &selection.picks[0];
        assert_eq!(pick.record.play_count, 3);
        assert_eq!(library.records()[pick.row], pick.record);
    }

    #[test]
    fn empty_pool_fails_without_mutation() {
        let mut library = Library::new(vec![record("Ann", Gender::Male, "One", 0)]);
        let before = library.clone();
        let mut rng = StdRng::seed_from_u64(1);

        let err = draw(&mut library, Gender::Female, 3, date(2024, 3, 2), &mut rng).unwrap_err();

        assert!(matches!(
            err,
            LibraryError::EmptyPool {
                category: Gender::Female
            }
        ));
        assert_eq!(library, before);
    }

    #[test]
    fn zero_request_changes_nothing() {
        let mut library = mixed_library();
        let before = library.clone();
        let mut rng = StdRng::seed_from_u64(1);
        let selection = draw(&mut library, Gender::Male, 0, date(2024, 3, 1), &mut rng).unwrap();
        assert!(selection.is_empty());
        assert_eq!(library, before);
    }

    #[test]
    fn fresh_songs_win_more_often() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut fresh_wins = 0;
        for _ in 0..2000 {
            let mut library = Library::new(vec![
                record("Ann", Gender::Male, "Fresh", 0),
                record("Bob", Gender::Male, "Worn", 9),
            ]);
            let selection =
                draw(&mut library, Gender::Male, 1, date(2024, 3, 1), &mut rng).unwrap();
            if selection.picks[0].row == 0 {
                fresh_wins += 1;
            }
        }
        // Expected share is 1 / 1.1, roughly 91%.
        assert!(fresh_wins > 1700, "fresh song won {fresh_wins} of 2000");
        assert!(fresh_wins < 2000);
    }

    #[test]
    fn playlist_lists_picks_in_order() {
        let selection = Selection {
            category: Gender::Female,
            drawn_on: date(2024, 3, 1),
            playlist_day: date(2024, 3, 2),
            picks: vec![
                Pick {
                    row: 3,
                    record: record("Dee", Gender::Female, "Four", 3),
                },
                Pick {
                    row: 1,
                    record: record("Bea", Gender::Female, "Two", 3),
                },
            ],
        };
        assert_eq!(
            selection.playlist(),
            "Female playlist · 2024-03-02\n1. Four — Dee\n2. Two — Bea"
        );
    }
}
