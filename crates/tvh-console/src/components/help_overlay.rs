//! HelpOverlay component — centered popup with keyboard shortcut reference.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{C_MUTED, C_PANEL_BORDER, C_PRIMARY, C_SECONDARY},
};

pub struct HelpOverlay;

impl HelpOverlay {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HelpOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for HelpOverlay {
    fn id(&self) -> ComponentId {
        ComponentId::HelpOverlay
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        // Any key closes the overlay; q still quits.
        match key.code {
            KeyCode::Char('q') => vec![Action::ToggleHelp, Action::Quit],
            _ => vec![Action::ToggleHelp],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, _state: &AppState) {
        let help_lines: Vec<Line> = vec![
            Line::from(Span::styled(
                " keyboard shortcuts",
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            heading(" programme guide"),
            help_row("↑ / ↓  or  j / k", "move selection"),
            help_row("pg up / pg dn", "page"),
            help_row("home / end", "first / last row"),
            help_row("enter", "broadcast details"),
            help_row("/", "search title (enter applies, empty clears)"),
            help_row("c / t / g", "pick channel / tag / content type"),
            help_row("[ / ]", "move minimum duration"),
            help_row("{ / }", "move maximum duration"),
            help_row("x", "reset all filters"),
            help_row("r", "reload"),
            help_row("A", "create auto-record rule from filters"),
            help_row("e", "show / hide end column"),
            Line::from(""),
            heading(" broadcast details"),
            help_row("r / s", "record program / series (autorec)"),
            help_row("p", "choose DVR profile"),
            help_row("esc", "close"),
            Line::from(""),
            heading(" configuration"),
            help_row("← / →", "previous / next table"),
            help_row("a / d", "add / delete entry"),
            help_row("u / n", "move stream filter up / down"),
            help_row("r", "reload table"),
            Line::from(""),
            heading(" general"),
            help_row("1 / 2", "guide / configuration workspace"),
            help_row("K", "toggle keys bar"),
            help_row("?", "toggle this help"),
            help_row("q  or  ctrl-c", "quit"),
        ];

        let popup = centered_rect(64, help_lines.len() as u16 + 2, area);
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(help_lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(C_PANEL_BORDER))
                    .style(Style::default().bg(ratatui::style::Color::Rgb(18, 18, 26))),
            ),
            popup,
        );
    }
}

fn heading(text: &str) -> Line<'_> {
    Line::from(Span::styled(
        text,
        Style::default().fg(C_MUTED).add_modifier(Modifier::BOLD),
    ))
}

fn help_row<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw(" "),
        Span::styled(
            format!("{:<18}", key),
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        ),
        Span::styled(desc, Style::default().fg(C_SECONDARY)),
    ])
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height.min(r.height)),
            Constraint::Min(0),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vert[1])[1]
}
