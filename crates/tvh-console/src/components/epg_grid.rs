//! EpgGrid — the virtualized programme table.
//!
//! Only the rows inside the viewport are rendered.  After each frame the App
//! reads [`EpgGrid::viewport`] and asks the query to cover it; rows that are
//! not loaded yet show as placeholders until their page arrives.

use chrono::{DateTime, Local, TimeZone, Utc};
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::Span,
    widgets::{Cell, Row, Table},
    Frame,
};

use tvh_proto::catalog::Catalogs;
use tvh_proto::model::Event;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{
        style_aired, style_default, style_header, style_muted, style_selected, C_BUFFERING,
        C_CHANNEL, C_GENRE, C_SCHEDULED, C_STARS,
    },
    widgets::pane_chrome::{pane_chrome, Badge},
};

/// `"1 hrs, 30 min"`, `"2 hrs"` or `"45 min"`; seconds are truncated.
pub fn format_duration(seconds: i64) -> String {
    let minutes = seconds.max(0) / 60;
    if minutes >= 60 {
        let (hours, min) = (minutes / 60, minutes % 60);
        if min == 0 {
            format!("{} hrs", hours)
        } else {
            format!("{} hrs, {} min", hours, min)
        }
    } else {
        format!("{} min", minutes)
    }
}

/// `"Mon, Jan 06, 20:15"` in the given zone.
pub fn format_time_in<Tz: TimeZone>(at: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.with_timezone(tz).format("%a, %b %d, %H:%M").to_string()
}

pub fn format_time(at: &DateTime<Utc>) -> String {
    format_time_in(at, &Local)
}

/// Programmes that have already started render emphasized.
pub fn row_style(event: &Event, now: DateTime<Utc>) -> Style {
    if event.has_started(now) {
        style_aired()
    } else {
        style_default()
    }
}

fn int_cell(value: u32) -> String {
    if value == 0 {
        String::new()
    } else {
        value.to_string()
    }
}

pub struct EpgGrid {
    /// Absolute row index in the result set.
    selected: usize,
    scroll_offset: usize,
    viewport_rows: usize,
    seen_version: u64,
}

impl EpgGrid {
    pub fn new() -> Self {
        Self {
            selected: 0,
            scroll_offset: 0,
            viewport_rows: 0,
            seen_version: 0,
        }
    }

    /// `(first_row, row_count)` drawn by the last frame.
    pub fn viewport(&self) -> (usize, usize) {
        (self.scroll_offset, self.viewport_rows)
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// A new predicate-set version starts again at the top.
    fn follow_version(&mut self, state: &AppState) {
        let version = state.browser.query().version();
        if version != self.seen_version {
            self.seen_version = version;
            self.selected = 0;
            self.scroll_offset = 0;
        }
    }

    fn move_by(&mut self, delta: isize, total: usize) {
        if total == 0 {
            self.selected = 0;
            return;
        }
        let target = self.selected as isize + delta;
        self.selected = target.clamp(0, total as isize - 1) as usize;
    }

    fn scroll_into_view(&mut self, total: usize) {
        if total == 0 {
            self.selected = 0;
            self.scroll_offset = 0;
            return;
        }
        self.selected = self.selected.min(total - 1);
        if self.viewport_rows == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + self.viewport_rows {
            self.scroll_offset = self.selected + 1 - self.viewport_rows;
        }
        let max_offset = total.saturating_sub(self.viewport_rows);
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    fn event_row<'a>(
        event: &'a Event,
        catalogs: &'a Catalogs,
        now: DateTime<Utc>,
        show_end: bool,
    ) -> Row<'a> {
        let scheduled = event
            .schedstate
            .as_deref()
            .is_some_and(|s| !s.is_empty());
        let mut cells = vec![
            Cell::from(Span::styled(
                if scheduled { "●" } else { " " },
                Style::default().fg(C_SCHEDULED),
            )),
            Cell::from(event.title.as_str()),
            Cell::from(event.subtitle().unwrap_or("")),
            Cell::from(event.episode().unwrap_or("")),
            Cell::from(format_time(&event.start)),
        ];
        if show_end {
            cells.push(Cell::from(format_time(&event.end)));
        }
        let genre = event
            .contenttype
            .map(|code| catalogs.content_group_name(code))
            .unwrap_or("");
        cells.extend([
            Cell::from(format_duration(event.duration)),
            Cell::from(Span::styled(event.channel.as_str(), Style::default().fg(C_CHANNEL))),
            Cell::from(Span::styled(int_cell(event.starrating), Style::default().fg(C_STARS))),
            Cell::from(int_cell(event.agerating)),
            Cell::from(Span::styled(genre, Style::default().fg(C_GENRE))),
        ]);
        Row::new(cells).style(row_style(event, now))
    }

    fn widths(show_end: bool) -> Vec<Constraint> {
        let mut w = vec![
            Constraint::Length(1),
            Constraint::Fill(3),
            Constraint::Fill(2),
            Constraint::Length(10),
            Constraint::Length(18),
        ];
        if show_end {
            w.push(Constraint::Length(18));
        }
        w.extend([
            Constraint::Length(13),
            Constraint::Fill(2),
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Fill(2),
        ]);
        w
    }

    fn header(show_end: bool) -> Row<'static> {
        let mut names = vec!["", "Title", "SubTitle", "Episode", "Start"];
        if show_end {
            names.push("End");
        }
        names.extend(["Duration", "Channel", "Stars", "Age", "Content Type"]);
        Row::new(names).style(style_header())
    }
}

impl Default for EpgGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for EpgGrid {
    fn id(&self) -> ComponentId {
        ComponentId::EpgGrid
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        self.follow_version(state);
        let total = state.browser.query().total_count();
        let page = self.viewport_rows.max(1) as isize;
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_by(-1, total),
            KeyCode::Down | KeyCode::Char('j') => self.move_by(1, total),
            KeyCode::PageUp => self.move_by(-page, total),
            KeyCode::PageDown => self.move_by(page, total),
            KeyCode::Home => self.move_by(isize::MIN / 2, total),
            KeyCode::End => self.move_by(isize::MAX / 2, total),
            KeyCode::Enter => {
                if let Some(event) = state.browser.query().row(self.selected) {
                    return vec![Action::OpenDetail(Box::new(event.clone()))];
                }
            }
            _ => {}
        }
        self.scroll_into_view(total);
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        self.follow_version(state);
        let query = state.browser.query();
        let badge = query.loading().then_some(Badge {
            text: "Buffering…",
            color: C_BUFFERING,
        });
        let block = pane_chrome("Electronic Program Guide", focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        // One row goes to the column header.
        self.viewport_rows = inner.height.saturating_sub(1) as usize;
        let total = query.total_count();
        self.scroll_into_view(total);

        let show_end = state.show_end_column;
        let end = (self.scroll_offset + self.viewport_rows).min(total);
        let rows: Vec<Row> = (self.scroll_offset..end)
            .map(|idx| {
                let row = match query.row(idx) {
                    Some(event) => Self::event_row(event, &state.catalogs, state.now, show_end),
                    None => Row::new(vec![Cell::from(""), Cell::from("…")]).style(style_muted()),
                };
                if idx == self.selected && focused {
                    row.style(style_selected())
                } else {
                    row
                }
            })
            .collect();

        let table = Table::new(rows, Self::widths(show_end))
            .header(Self::header(show_end))
            .column_spacing(1);
        frame.render_widget(table, inner);
    }
}
