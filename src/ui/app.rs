use std::cmp::min;
use std::mem;

use chrono::{Local, NaiveDate};
use crossterm::event::KeyCode;
use directories::BaseDirs;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use tracing::{info, warn};

use crate::config::Config;
use crate::draw::{active_category, draw, next_day};
use crate::models::{Library, DATE_FORMAT};
use crate::store::{import, read_table, ColumnMapping, LibraryStore};

use super::forms::{ConfirmImport, PathForm, SongField, SongForm};
use super::helpers::{centered_rect, count_slider, gender_style, surface_error};
use super::screens::{DrawScreen, LibraryScreen, MAX_DRAW_COUNT};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height allocation per song card in the library list.
const SONG_CARD_HEIGHT: u16 = 5;

/// High-level navigation states.
enum Screen {
    Library,
    Draw(DrawScreen),
}

/// Fine-grained modes scoped to the current screen.
enum Mode {
    Normal,
    EditingSong { row: usize, form: SongForm },
    ChoosingImport(PathForm),
    ConfirmImport(ConfirmImport),
    Searching(SearchState),
}

/// State for an active inline search.
struct SearchState {
    query: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI. Owns the in-memory
/// library and the store it is saved to after every change.
pub struct App {
    store: LibraryStore,
    library: Library,
    config: Config,
    browser: LibraryScreen,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
    saved_search: Option<SearchState>,
}

impl App {
    pub fn new(store: LibraryStore, library: Library, config: Config) -> Self {
        let browser = LibraryScreen::new(&library);
        Self {
            store,
            library,
            config,
            browser,
            screen: Screen::Library,
            mode: Mode::Normal,
            status: None,
            saved_search: None,
        }
    }

    /// Process one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::EditingSong { row, form } => self.handle_edit_song(code, row, form),
            Mode::ChoosingImport(form) => self.handle_choose_import(code, form),
            Mode::ConfirmImport(confirm) => self.handle_confirm_import(code, confirm),
            Mode::Searching(state) => self.handle_search(code, state),
        };

        exit
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match self.screen {
            Screen::Library => match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    *exit = true;
                }
                KeyCode::Up => self.browser.move_selection(-1),
                KeyCode::Down => self.browser.move_selection(1),
                KeyCode::PageUp => self.browser.move_selection(-5),
                KeyCode::PageDown => self.browser.move_selection(5),
                KeyCode::Home => self.browser.select_first(),
                KeyCode::End => self.browser.select_last(),
                KeyCode::Char('f') => {
                    return Mode::Searching(SearchState {
                        query: self.browser.filter.clone().unwrap_or_default(),
                    });
                }
                KeyCode::Char('e') | KeyCode::Char('E') => {
                    if let Some(mode) = self.edit_current() {
                        return mode;
                    }
                }
                KeyCode::Enter => self.open_current_link(),
                KeyCode::Char('i') | KeyCode::Char('I') => {
                    self.clear_status();
                    return Mode::ChoosingImport(PathForm::default());
                }
                KeyCode::Char('d') | KeyCode::Char('D') => {
                    self.clear_status();
                    self.screen = Screen::Draw(DrawScreen::new(today()));
                }
                _ => {}
            },
            Screen::Draw(_) => match code {
                KeyCode::Char('q') => {
                    *exit = true;
                }
                KeyCode::Esc | KeyCode::Char('d') | KeyCode::Char('D') => {
                    self.screen = Screen::Library;
                    self.clear_status();
                }
                KeyCode::Left | KeyCode::Char('-') => self.adjust_draw_count(-1),
                KeyCode::Right | KeyCode::Char('+') => self.adjust_draw_count(1),
                KeyCode::Enter | KeyCode::Char(' ') => self.perform_draw(),
                KeyCode::Char('x') | KeyCode::Char('X') => self.export_playlist(),
                _ => {}
            },
        }
        Mode::Normal
    }

    fn handle_edit_song(&mut self, code: KeyCode, row: usize, mut form: SongForm) -> Mode {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match form.changes(&self.library, row) {
                Ok(updates) if updates.is_empty() => {
                    self.set_status("No changes.", StatusKind::Info);
                    keep_open = false;
                }
                Ok(updates) => {
                    let mut failed = None;
                    for update in updates {
                        let field = update.field_name();
                        if let Err(err) = self.library.update_field(row, update) {
                            failed = Some(err.to_string());
                            break;
                        }
                        info!(row, field, "edited song");
                    }
                    self.browser.refresh(&self.library);
                    match failed {
                        Some(message) => {
                            form.error = Some(message.clone());
                            self.set_status(message, StatusKind::Error);
                        }
                        None => {
                            self.save_with_status("Song updated.");
                            keep_open = false;
                        }
                    }
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Mode::EditingSong { row, form }
        } else if let Some(state) = self.saved_search.take() {
            Mode::Searching(state)
        } else {
            Mode::Normal
        }
    }

    fn handle_choose_import(&mut self, code: KeyCode, mut form: PathForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Import cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
                let path = match form.parse_path(home) {
                    Ok(path) => path,
                    Err(err) => {
                        form.error = Some(surface_error(&err));
                        return Mode::ChoosingImport(form);
                    }
                };

                match read_table(&path).and_then(|raw| import(&raw, &ColumnMapping::default())) {
                    Ok(library) => {
                        self.clear_status();
                        return Mode::ConfirmImport(ConfirmImport { path, library });
                    }
                    Err(err) => {
                        warn!(error = %err, path = %path.display(), "import rejected");
                        let message = err.to_string();
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::ChoosingImport(form)
    }

    fn handle_confirm_import(&mut self, code: KeyCode, confirm: ConfirmImport) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Import cancelled. Library unchanged.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                let ConfirmImport { path, library } = confirm;
                let count = library.len();
                self.library = library;
                self.browser.set_filter(&self.library, None);
                if let Screen::Draw(state) = &mut self.screen {
                    state.selection = None;
                }
                self.save_with_status(format!("Imported {count} songs from {}.", path.display()));
                Mode::Normal
            }
            _ => Mode::ConfirmImport(confirm),
        }
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Mode {
        if !matches!(self.screen, Screen::Library) {
            return Mode::Normal;
        }

        match code {
            KeyCode::Esc => {
                self.browser.set_filter(&self.library, None);
                return Mode::Normal;
            }
            KeyCode::Enter => return Mode::Normal,
            KeyCode::Up => {
                self.browser.move_selection(-1);
                return Mode::Searching(state);
            }
            KeyCode::Down => {
                self.browser.move_selection(1);
                return Mode::Searching(state);
            }
            KeyCode::PageUp => {
                self.browser.move_selection(-5);
                return Mode::Searching(state);
            }
            KeyCode::PageDown => {
                self.browser.move_selection(5);
                return Mode::Searching(state);
            }
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => state.query.push(ch),
            _ => {}
        }

        let filter = if state.query.trim().is_empty() {
            None
        } else {
            Some(state.query.clone())
        };
        self.browser.set_filter(&self.library, filter);
        Mode::Searching(state)
    }

    /// Jump from an active search straight into editing the highlighted song,
    /// returning to the search once the edit closes.
    pub(crate) fn handle_ctrl_e(&mut self) {
        if !matches!(self.mode, Mode::Searching(_)) {
            return;
        }

        let previous = mem::replace(&mut self.mode, Mode::Normal);
        if let Mode::Searching(state) = previous {
            self.saved_search = Some(state);
        }
        match self.edit_current() {
            Some(mode) => self.mode = mode,
            None => {
                if let Some(state) = self.saved_search.take() {
                    self.mode = Mode::Searching(state);
                }
            }
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Library => self.draw_library(frame, content_area),
            Screen::Draw(state) => self.draw_draw_screen(frame, content_area, state),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::EditingSong { form, .. } => self.draw_song_form(frame, area, form),
            Mode::ChoosingImport(form) => self.draw_import_form(frame, area, form),
            Mode::ConfirmImport(confirm) => self.draw_confirm_import(frame, area, confirm),
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::Normal => {}
        }
    }

    fn draw_library(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(1)])
            .split(area);

        let counts = self.library.counts();
        let today = today();
        let category = active_category(today);
        let target = next_day(today);
        let header = Paragraph::new(vec![
            Line::from(vec![
                Span::styled(
                    format!("{} songs", self.library.len()),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("  •  男 {}  •  女 {}", counts.male, counts.female)),
            ]),
            Line::from(vec![
                Span::raw(format!(
                    "Tomorrow ({}) draws from the ",
                    target.format(DATE_FORMAT)
                )),
                Span::styled(
                    format!("{category} ({})", category.label()),
                    gender_style(category).add_modifier(Modifier::BOLD),
                ),
                Span::raw(" pool"),
            ]),
        ])
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::ALL).title("SongMate"));
        frame.render_widget(header, chunks[0]);

        let list_area = chunks[1];
        if self.library.is_empty() {
            let message = Paragraph::new("No songs yet. Press 'i' to import a spreadsheet.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Library"));
            frame.render_widget(message, list_area);
            return;
        }

        if self.browser.rows.is_empty() {
            let message = Paragraph::new("No songs match the current search.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Library"));
            frame.render_widget(message, list_area);
            return;
        }

        self.render_song_cards(frame, list_area);
    }

    fn render_song_cards(&self, frame: &mut Frame, area: Rect) {
        let rows = &self.browser.rows;
        let selected = self.browser.selected;
        if rows.is_empty() || area.height == 0 {
            return;
        }

        let card_height = SONG_CARD_HEIGHT as usize;
        let capacity = ((area.height as usize) / card_height).max(1);
        let len = rows.len();
        let mut start = if selected >= capacity {
            selected + 1 - capacity
        } else {
            0
        };
        if start + capacity > len {
            start = len.saturating_sub(capacity);
        }
        let end = min(start + capacity, len);
        let visible_len = end.saturating_sub(start);
        if visible_len == 0 {
            return;
        }

        let constraints: Vec<Constraint> = (0..visible_len)
            .map(|_| Constraint::Length(SONG_CARD_HEIGHT))
            .collect();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (idx, chunk) in chunks.iter().enumerate() {
            let position = start + idx;
            let Some(record) = rows.get(position).and_then(|&row| self.library.get(row)) else {
                break;
            };

            let is_selected = position == selected;
            let mut block = Block::default().borders(Borders::ALL);
            let mut paragraph_style = Style::default();
            if is_selected {
                block = block.style(Style::default().fg(Color::Yellow));
                paragraph_style = Style::default().fg(Color::Yellow);
            }

            let title = if is_selected {
                format!("▶ {}", record.title)
            } else {
                record.title.clone()
            };
            let requester = if record.requester.trim().is_empty() {
                "Unknown requester".to_string()
            } else {
                record.requester.clone()
            };

            let mut lines = vec![
                Line::from(Span::styled(
                    title,
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(vec![
                    Span::styled(requester, Style::default().fg(Color::Gray)),
                    Span::raw("  "),
                    Span::styled(record.gender.label(), gender_style(record.gender)),
                    Span::styled(
                        format!(
                            "  •  played {}×  •  {}",
                            record.play_count,
                            record.last_played_text()
                        ),
                        Style::default().fg(Color::Gray),
                    ),
                ]),
            ];
            if let Some(link) = &record.link {
                lines.push(Line::from(Span::styled(
                    link.clone(),
                    Style::default().fg(Color::Cyan),
                )));
            }

            let paragraph = Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: true })
                .alignment(Alignment::Left)
                .style(paragraph_style);
            frame.render_widget(paragraph, *chunk);
        }
    }

    fn draw_draw_screen(&self, frame: &mut Frame, area: Rect, state: &DrawScreen) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(1)])
            .split(area);

        let category = state.category();
        let pool = self.library.counts().for_category(category);
        let header = Paragraph::new(vec![
            Line::from(vec![
                Span::raw(format!(
                    "Tomorrow ({}) is a ",
                    state.target_date().format(DATE_FORMAT)
                )),
                Span::styled(
                    format!("{category} ({})", category.label()),
                    gender_style(category).add_modifier(Modifier::BOLD),
                ),
                Span::raw(" day"),
            ]),
            Line::from(format!("{pool} songs in the pool")),
            Line::from(vec![
                Span::raw("Songs to draw: "),
                Span::styled(
                    count_slider(state.count, MAX_DRAW_COUNT),
                    Style::default().fg(Color::Yellow),
                ),
            ]),
        ])
        .block(Block::default().borders(Borders::ALL).title("Draw"));
        frame.render_widget(header, chunks[0]);

        let content = match &state.selection {
            Some(selection) if !selection.is_empty() => selection.playlist(),
            Some(_) => "Nothing was drawn.".to_string(),
            None => "Press Enter to draw.".to_string(),
        };
        let playlist = Paragraph::new(content)
            .block(Block::default().borders(Borders::ALL).title("Playlist"))
            .wrap(Wrap { trim: false });
        frame.render_widget(playlist, chunks[1]);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&str, &str)] = match (&self.screen, &self.mode) {
            (_, Mode::EditingSong { .. }) => &[
                ("[Tab]", "Next Field"),
                ("[Enter]", "Save"),
                ("[Esc]", "Cancel"),
            ],
            (_, Mode::ChoosingImport(_)) => &[("[Enter]", "Read File"), ("[Esc]", "Cancel")],
            (_, Mode::ConfirmImport(_)) => &[("[y]", "Replace Library"), ("[n]", "Keep Current")],
            (_, Mode::Searching(_)) => &[
                ("[↑↓]", "Select"),
                ("[Ctrl+E]", "Edit"),
                ("[Enter]", "Keep Filter"),
                ("[Esc]", "Clear"),
            ],
            (Screen::Draw(_), _) => &[
                ("[←→]", "Count"),
                ("[Enter]", "Draw"),
                ("[x]", "Export"),
                ("[Esc]", "Library"),
                ("[q]", "Quit"),
            ],
            (Screen::Library, _) => &[
                ("[↑↓]", "Select"),
                ("[Enter]", "Open Link"),
                ("[f]", "Search"),
                ("[e]", "Edit"),
                ("[i]", "Import"),
                ("[d]", "Draw"),
                ("[q]", "Quit"),
            ],
        };

        let mut spans = Vec::with_capacity(keys.len() * 2);
        for (index, (key, action)) in keys.iter().enumerate() {
            spans.push(Span::styled(key.to_string(), key_style));
            if index + 1 == keys.len() {
                spans.push(Span::raw(format!(" {action}")));
            } else {
                spans.push(Span::raw(format!(" {action}   ")));
            }
        }
        Line::from(spans)
    }

    fn draw_song_form(&self, frame: &mut Frame, area: Rect, form: &SongForm) {
        let popup_area = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Edit Song").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = SongField::ORDER
            .iter()
            .map(|&field| form.build_line(field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • m/f sets gender • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let line_index = SongField::ORDER
            .iter()
            .position(|&field| field == form.active)
            .unwrap_or(0) as u16;
        let prefix = format!("{}: ", form.active.label()).len() as u16;
        frame.set_cursor_position((
            inner.x + prefix + form.value_len(form.active) as u16,
            inner.y + line_index,
        ));
    }

    fn draw_import_form(&self, frame: &mut Frame, area: Rect, form: &PathForm) {
        let popup_area = centered_rect(70, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Import Spreadsheet")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            Line::from(vec![
                Span::raw("File: "),
                Span::styled(form.path.clone(), Style::default().fg(Color::Yellow)),
            ]),
            Line::from(Span::styled(
                "Columns: Requester, Gender, Title, Link (.xlsx, .xls, .ods or .csv)",
                Style::default().fg(Color::Gray),
            )),
            Line::from(""),
        ];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
        frame.set_cursor_position((
            inner.x + "File: ".len() as u16 + form.path.chars().count() as u16,
            inner.y,
        ));
    }

    fn draw_confirm_import(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmImport) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Confirm Import").borders(Borders::ALL);
        let counts = confirm.library.counts();
        let lines = vec![
            Line::from(format!(
                "Read {} songs (男 {}, 女 {}) from {}.",
                confirm.library.len(),
                counts.male,
                counts.female,
                confirm.path.display()
            )),
            Line::from(Span::styled(
                format!(
                    "This replaces all {} current songs and resets every play count.",
                    self.library.len()
                ),
                Style::default().fg(Color::Red),
            )),
            Line::from(""),
            Line::from("Press y to import or n to cancel."),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    /// Persist the library, reporting `success` or the save failure.
    fn save_with_status<S: Into<String>>(&mut self, success: S) {
        match self.store.persist(&self.library) {
            Ok(()) => self.set_status(success, StatusKind::Info),
            Err(err) => {
                warn!(error = %err, "failed to save library");
                self.set_status(
                    format!("Could not save library: {err}"),
                    StatusKind::Error,
                );
            }
        }
    }

    fn edit_current(&mut self) -> Option<Mode> {
        let found = self.browser.current_row().and_then(|row| {
            self.library
                .get(row)
                .map(|record| (row, SongForm::from_record(record)))
        });
        match found {
            Some((row, form)) => Some(Mode::EditingSong { row, form }),
            None => {
                self.set_status("No song selected to edit.", StatusKind::Error);
                None
            }
        }
    }

    fn open_current_link(&mut self) {
        let Some((title, link)) = self
            .browser
            .current_row()
            .and_then(|row| self.library.get(row))
            .map(|record| (record.display_title(), record.link.clone()))
        else {
            return;
        };

        match link {
            None => self.set_status("This song does not have a link.", StatusKind::Error),
            Some(link) => {
                if let Err(err) = open_link(&link) {
                    self.set_status(format!("Failed to open link: {err}"), StatusKind::Error);
                } else {
                    self.set_status(format!("Opened {title}."), StatusKind::Info);
                }
            }
        }
    }

    fn perform_draw(&mut self) {
        let (category, count, today) = match &self.screen {
            Screen::Draw(state) => (state.category(), state.count, state.today),
            Screen::Library => return,
        };

        match draw(
            &mut self.library,
            category,
            count,
            today,
            &mut rand::thread_rng(),
        ) {
            Ok(selection) => {
                let picked = selection.len();
                if let Screen::Draw(state) = &mut self.screen {
                    state.selection = Some(selection);
                }
                self.browser.refresh(&self.library);
                self.save_with_status(format!("Drew {picked} {category} songs and saved play counts."));
            }
            Err(err) => {
                warn!(error = %err, "draw failed");
                self.set_status(err.to_string(), StatusKind::Error);
            }
        }
    }

    fn adjust_draw_count(&mut self, delta: isize) {
        if let Screen::Draw(state) = &mut self.screen {
            state.adjust_count(delta);
        }
    }

    fn export_playlist(&mut self) {
        let outcome = match &self.screen {
            Screen::Draw(state) => match &state.selection {
                Some(selection) if !selection.is_empty() => {
                    let path = self.config.playlist_path(selection.playlist_day);
                    Some(selection.export_playlist(&path).map(|()| path))
                }
                _ => None,
            },
            Screen::Library => return,
        };

        match outcome {
            None => self.set_status("Draw some songs before exporting.", StatusKind::Error),
            Some(Ok(path)) => self.set_status(
                format!("Saved playlist to {}.", path.display()),
                StatusKind::Info,
            ),
            Some(Err(err)) => self.set_status(
                format!("Could not export playlist: {err}"),
                StatusKind::Error,
            ),
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
