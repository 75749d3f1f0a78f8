use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};

use crate::models::Gender;

/// Text slider for the draw count, e.g. `[■■■□□]  3`.
pub(crate) fn count_slider(count: usize, max: usize) -> String {
    let filled = count.min(max);
    format!(
        "[{}{}] {:>2}",
        "■".repeat(filled),
        "□".repeat(max - filled),
        count
    )
}

/// Accent colour for a draw category.
pub(crate) fn gender_style(gender: Gender) -> Style {
    match gender {
        Gender::Male => Style::default().fg(Color::Blue),
        Gender::Female => Style::default().fg(Color::Magenta),
    }
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

#[cfg(test)]
mod tests {
    use anyhow::{anyhow, Context};

    use super::*;

    #[test]
    fn slider_fills_to_count() {
        assert_eq!(count_slider(3, 5), "[■■■□□]  3");
        assert_eq!(count_slider(10, 10), "[■■■■■■■■■■] 10");
    }

    #[test]
    fn surfaced_error_is_the_root_cause() {
        let err = Err::<(), _>(anyhow!("no songs in the Male pool"))
            .context("draw failed")
            .unwrap_err();
        assert_eq!(surface_error(&err), "no songs in the Male pool");
    }
}
