//! FilterBar — the toolbar above the guide: title search, channel, tag and
//! genre selections, and the duration range slider.

use ratatui::crossterm::event::{KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use tvh_proto::catalog::{self, DURATION_BUCKETS};
use tvh_proto::filter::DurationRange;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{C_ACCENT, C_FILTER_FG, C_MUTED, C_PRIMARY, C_SECONDARY},
    widgets::filter_input::{FilterAction, FilterInput},
};

/// Text rendition of the two-thumb slider, one cell per bucket:
/// `─●━━━●──` with the selected span drawn heavy.
pub fn slider_track(range: DurationRange) -> String {
    (0..DURATION_BUCKETS.len())
        .map(|i| {
            if i == range.min || i == range.max {
                '●'
            } else if i > range.min && i < range.max {
                '━'
            } else {
                '─'
            }
        })
        .collect()
}

pub struct FilterBar {
    title_input: FilterInput,
}

impl FilterBar {
    pub fn new() -> Self {
        Self {
            title_input: FilterInput::new("title: ", "Search title..."),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.title_input.is_active()
    }

    fn combo<'a>(key: &'a str, label: &'a str, value: Option<String>) -> Vec<Span<'a>> {
        let (text, style) = match value {
            Some(v) => (v, Style::default().fg(C_FILTER_FG)),
            None => ("any".to_string(), Style::default().fg(C_MUTED)),
        };
        vec![
            Span::styled(format!("[{}] ", key), Style::default().fg(C_ACCENT)),
            Span::styled(format!("{}: ", label), Style::default().fg(C_SECONDARY)),
            Span::styled(text, style),
            Span::raw("   "),
        ]
    }
}

impl Default for FilterBar {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for FilterBar {
    fn id(&self) -> ComponentId {
        ComponentId::FilterBar
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match self.title_input.handle_key(key) {
            FilterAction::Submitted(text) => {
                let title = (!text.is_empty()).then_some(text);
                vec![Action::SetTitle(title)]
            }
            // Esc leaves the applied title untouched.
            FilterAction::Cancelled | FilterAction::Edited(_) | FilterAction::None => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, state: &AppState) -> Vec<Action> {
        if let Action::OpenTitleFilter = action {
            let current = state.browser.filter().title().unwrap_or("");
            self.title_input.activate(current);
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(area);

        let filter = state.browser.filter();
        let catalogs = &state.catalogs;

        // Row 1: title search (editable) and the three lookup combos.
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(40), Constraint::Min(0)])
            .split(rows[0]);
        if self.title_input.is_active() {
            self.title_input.draw(frame, cols[0]);
        } else {
            let line = match filter.title() {
                Some(t) => Line::from(vec![
                    Span::styled("[/] title: ", Style::default().fg(C_SECONDARY)),
                    Span::styled(t, Style::default().fg(C_FILTER_FG)),
                ]),
                None => Line::from(vec![
                    Span::styled("[/] ", Style::default().fg(C_ACCENT)),
                    Span::styled("Search title...", Style::default().fg(C_MUTED)),
                ]),
            };
            frame.render_widget(Paragraph::new(line), cols[0]);
        }

        let channel = filter.channel().map(|key| catalogs.channel_label(key));
        let genre = filter.content_type().map(|code| catalogs.content_group_label(code));
        let mut spans = Self::combo("c", "Channel", channel);
        spans.extend(Self::combo("t", "Tag", filter.tag().map(str::to_string)));
        spans.extend(Self::combo("g", "Genre", genre));
        frame.render_widget(Paragraph::new(Line::from(spans)), cols[1]);

        // Row 2: duration range slider.
        let range = filter.duration();
        let value_style = if range.is_full() {
            Style::default().fg(C_MUTED)
        } else {
            Style::default().fg(C_FILTER_FG)
        };
        let line = Line::from(vec![
            Span::styled("[ ] { } ", Style::default().fg(C_ACCENT)),
            Span::styled("Duration: ", Style::default().fg(C_SECONDARY)),
            Span::styled(catalog::bucket(range.min).label, value_style),
            Span::raw(" "),
            Span::styled(
                slider_track(range),
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(catalog::bucket(range.max).label, value_style),
            Span::styled(
                format!("   {} active", filter.active_count()),
                Style::default().fg(C_MUTED),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), rows[1]);
    }
}
