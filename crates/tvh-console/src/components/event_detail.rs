//! EventDetail — overlay with the full programme record, its related
//! broadcasts and the record buttons.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Wrap},
    Frame,
};

use tvh_proto::detail::{alternative_line, related_line, EventDetail};
use tvh_proto::model::RecordOp;

use crate::{
    action::{Action, ComponentId, PickerKind},
    app_state::AppState,
    component::Component,
    components::epg_grid::{format_duration, format_time},
    theme::{C_ACCENT, C_BUFFERING, C_CHANNEL, C_GENRE, C_MUTED, C_PRIMARY, C_SECONDARY},
    widgets::pane_chrome::{pane_chrome, Badge},
};

pub struct EventDetailView {
    scroll: u16,
}

impl EventDetailView {
    pub fn new() -> Self {
        Self { scroll: 0 }
    }

    fn field<'a>(label: &'a str, value: String, color: ratatui::style::Color) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("{:<10}", label), Style::default().fg(C_SECONDARY)),
            Span::styled(value, Style::default().fg(color)),
        ])
    }

    fn section(title: &str) -> Line<'static> {
        Line::from(Span::styled(
            title.to_string(),
            Style::default().fg(C_MUTED).add_modifier(Modifier::BOLD),
        ))
    }

    fn lines<'a>(detail: &'a EventDetail, state: &'a AppState) -> Vec<Line<'a>> {
        let ev = &detail.event;
        let mut lines = vec![
            Line::from(Span::styled(
                detail.heading(),
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Self::field("Channel", ev.channel.clone(), C_CHANNEL),
            Self::field(
                "When",
                format!(
                    "{}  →  {}  ({})",
                    format_time(&ev.start),
                    format_time(&ev.end),
                    format_duration(ev.duration)
                ),
                C_PRIMARY,
            ),
        ];
        if let Some(episode) = ev.episode() {
            lines.push(Self::field("Episode", episode.to_string(), C_PRIMARY));
        }
        if ev.starrating > 0 {
            lines.push(Self::field("Stars", ev.starrating.to_string(), C_PRIMARY));
        }
        if ev.agerating > 0 {
            lines.push(Self::field("Age", ev.agerating.to_string(), C_PRIMARY));
        }
        if let Some(code) = ev.contenttype {
            let name = state.catalogs.content_group_name(code);
            if !name.is_empty() {
                lines.push(Self::field("Genre", name.to_string(), C_GENRE));
            }
        }
        if let Some(desc) = ev.description.as_deref().filter(|d| !d.is_empty()) {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(desc, Style::default().fg(C_PRIMARY))));
        }
        lines.push(Line::from(""));
        if let Some(play) = detail.play_url(&state.server, state.now) {
            lines.push(Self::field("Play", play.to_string(), C_ACCENT));
        }
        if let Some(imdb) = detail.imdb_search_url() {
            lines.push(Self::field("IMDB", imdb.to_string(), C_MUTED));
        }

        if let Some(alts) = detail.alternatives.as_ref().filter(|a| !a.is_empty()) {
            lines.push(Line::from(""));
            lines.push(Self::section("Alternative broadcasts"));
            lines.extend(alts.iter().map(|a| Line::from(format!("  {}", alternative_line(a)))));
        }
        if let Some(related) = detail.related.as_ref().filter(|r| !r.is_empty()) {
            lines.push(Line::from(""));
            lines.push(Self::section("Related episodes"));
            lines.extend(related.iter().map(|r| Line::from(format!("  {}", related_line(r)))));
        }

        lines.push(Line::from(""));
        lines.push(Self::field(
            "DVR",
            state.catalogs.config_label(&detail.config_name).to_string(),
            C_PRIMARY,
        ));
        lines.push(Line::from(vec![
            Span::styled("[r] ", Style::default().fg(C_ACCENT)),
            Span::styled("Record program   ", Style::default().fg(C_PRIMARY)),
            Span::styled("[s] ", Style::default().fg(C_ACCENT)),
            Span::styled(format!("{}   ", detail.series_label()), Style::default().fg(C_PRIMARY)),
            Span::styled("[p] ", Style::default().fg(C_ACCENT)),
            Span::styled("DVR profile   ", Style::default().fg(C_PRIMARY)),
            Span::styled("[Esc] ", Style::default().fg(C_ACCENT)),
            Span::styled("close", Style::default().fg(C_PRIMARY)),
        ]));
        lines
    }
}

impl Default for EventDetailView {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for EventDetailView {
    fn id(&self) -> ComponentId {
        ComponentId::EventDetail
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let Some(detail) = state.detail.as_ref() else {
            return vec![];
        };
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => vec![Action::CloseDetail],
            // One record request at a time.
            KeyCode::Char('r') if detail.pending.is_none() => vec![Action::Record(RecordOp::Event)],
            KeyCode::Char('s') if detail.pending.is_none() => {
                vec![Action::Record(RecordOp::Series)]
            }
            KeyCode::Char('p') => vec![Action::OpenPicker(PickerKind::DvrConfig)],
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll = self.scroll.saturating_sub(1);
                vec![]
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll = self.scroll.saturating_add(1);
                vec![]
            }
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::OpenDetail(_) = action {
            self.scroll = 0;
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        let Some(detail) = state.detail.as_ref() else {
            return;
        };
        let width = (area.width * 3 / 4).max(40.min(area.width));
        let height = (area.height * 4 / 5).max(12.min(area.height));
        let popup = Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        };
        frame.render_widget(Clear, popup);

        let badge = detail.pending.map(|_| Badge {
            text: "Recording…",
            color: C_BUFFERING,
        });
        let block = pane_chrome("Broadcast Details", true, badge);
        let paragraph = Paragraph::new(Self::lines(detail, state))
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));
        frame.render_widget(paragraph, popup);
    }
}
