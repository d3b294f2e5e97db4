//! FilterInput — single-line text entry built on tui-input.
//!
//! Used by the title filter (value applied on Enter) and by pickers (value
//! narrows the list on every keystroke).

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};
use unicode_width::UnicodeWidthStr;

use crate::theme::{C_FILTER_BG, C_FILTER_FG, C_MUTED, C_SECONDARY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    /// Text changed; carries the new value.
    Edited(String),
    /// Enter pressed; carries the final value.
    Submitted(String),
    Cancelled,
    None,
}

pub struct FilterInput {
    input: Input,
    active: bool,
    prompt: &'static str,
    placeholder: String,
}

impl FilterInput {
    pub fn new(prompt: &'static str, placeholder: impl Into<String>) -> Self {
        Self {
            input: Input::default(),
            active: false,
            prompt,
            placeholder: placeholder.into(),
        }
    }

    /// Start editing, pre-filled with `value`.
    pub fn activate(&mut self, value: &str) {
        self.input = Input::new(value.to_string());
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FilterAction {
        if !self.active {
            return FilterAction::None;
        }
        match key.code {
            KeyCode::Esc => {
                self.deactivate();
                FilterAction::Cancelled
            }
            KeyCode::Enter => {
                self.deactivate();
                FilterAction::Submitted(self.input.value().trim().to_string())
            }
            _ => {
                let before = self.input.value().to_string();
                self.input.handle_event(&Event::Key(key));
                if self.input.value() == before {
                    FilterAction::None
                } else {
                    FilterAction::Edited(self.input.value().to_string())
                }
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let prompt_w = self.prompt.width() as u16;
        let scroll = self
            .input
            .visual_scroll(area.width.saturating_sub(prompt_w + 1) as usize);
        let value = self.input.value();
        let body = if value.is_empty() {
            Span::styled(self.placeholder.as_str(), Style::default().fg(C_MUTED))
        } else {
            Span::styled(
                value.chars().skip(scroll).collect::<String>(),
                Style::default().fg(C_FILTER_FG),
            )
        };
        let line = Line::from(vec![
            Span::styled(self.prompt, Style::default().fg(C_SECONDARY)),
            body,
        ]);
        frame.render_widget(
            Paragraph::new(line).style(Style::default().bg(C_FILTER_BG)),
            area,
        );

        if self.active && area.width > 0 {
            let cursor_x = area.x + prompt_w + (self.input.visual_cursor() - scroll) as u16;
            frame.set_cursor_position((cursor_x.min(area.x + area.width - 1), area.y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_enter_submits_trimmed_text() {
        let mut f = FilterInput::new("title: ", "");
        f.activate("");
        for c in " News ".chars() {
            f.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(f.handle_key(key(KeyCode::Enter)), FilterAction::Submitted("News".into()));
        assert!(!f.is_active());
    }

    #[test]
    fn test_escape_cancels() {
        let mut f = FilterInput::new("/ ", "");
        f.activate("abc");
        assert_eq!(f.handle_key(key(KeyCode::Esc)), FilterAction::Cancelled);
        assert_eq!(f.handle_key(key(KeyCode::Char('x'))), FilterAction::None);
    }
}
