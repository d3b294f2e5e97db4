//! AutoRecDialog — confirmation popup before a standing rule is created.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Wrap},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{C_ACCENT, C_PRIMARY, C_SECONDARY},
    widgets::pane_chrome::pane_chrome,
};

pub struct AutoRecDialog;

impl AutoRecDialog {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AutoRecDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for AutoRecDialog {
    fn id(&self) -> ComponentId {
        ComponentId::AutoRecDialog
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release || state.autorec.is_none() {
            return vec![];
        }
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => vec![Action::ConfirmAutoRec(true)],
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                vec![Action::ConfirmAutoRec(false)]
            }
            // Modal: everything else is swallowed.
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        let Some(preview) = state.autorec.as_ref() else {
            return;
        };
        let message = preview.message();
        let width = 76.min(area.width);
        let height = (message.len() as u16 + 4).min(area.height);
        let popup = Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        };
        frame.render_widget(Clear, popup);

        let mut lines: Vec<Line> = message
            .into_iter()
            .map(|l| Line::from(Span::styled(l, Style::default().fg(C_PRIMARY))))
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(
                "[y] ",
                Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
            ),
            Span::styled("create rule   ", Style::default().fg(C_SECONDARY)),
            Span::styled(
                "[n] ",
                Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
            ),
            Span::styled("cancel", Style::default().fg(C_SECONDARY)),
        ]));

        let paragraph = Paragraph::new(lines)
            .block(pane_chrome("Auto Recorder", true, None))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, popup);
    }
}
