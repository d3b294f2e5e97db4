//! Toasts — short-lived notices stacked above the status bar.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::theme::{C_TOAST_ERROR, C_TOAST_INFO, C_TOAST_SUCCESS, C_TOAST_WARNING};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    fn icon(self) -> &'static str {
        match self {
            Self::Info => "·",
            Self::Success => "✓",
            Self::Warning => "!",
            Self::Error => "✗",
        }
    }

    fn color(self) -> ratatui::style::Color {
        match self {
            Self::Info => C_TOAST_INFO,
            Self::Success => C_TOAST_SUCCESS,
            Self::Warning => C_TOAST_WARNING,
            Self::Error => C_TOAST_ERROR,
        }
    }

    fn lifetime(self) -> Duration {
        match self {
            Self::Info | Self::Success => Duration::from_secs(3),
            Self::Warning => Duration::from_secs(4),
            Self::Error => Duration::from_secs(6),
        }
    }
}

struct Toast {
    message: String,
    severity: Severity,
    expires: Instant,
}

pub struct ToastManager {
    toasts: VecDeque<Toast>,
    max_visible: usize,
}

impl ToastManager {
    pub fn new() -> Self {
        Self {
            toasts: VecDeque::new(),
            max_visible: 4,
        }
    }

    pub fn push(&mut self, message: impl Into<String>, severity: Severity) {
        let message = message.into();
        // Repeating a notice refreshes it instead of stacking a copy.
        self.toasts.retain(|t| t.message != message);
        self.toasts.push_back(Toast {
            message,
            severity,
            expires: Instant::now() + severity.lifetime(),
        });
        while self.toasts.len() > self.max_visible {
            self.toasts.pop_front();
        }
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Success);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Error);
    }

    /// Drop expired toasts.  Returns true when something disappeared.
    pub fn tick(&mut self) -> bool {
        let now = Instant::now();
        let before = self.toasts.len();
        self.toasts.retain(|t| t.expires > now);
        self.toasts.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    /// Render newest-last, growing upward from the bottom-right of `area`.
    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        if self.is_empty() || area.height < 2 {
            return;
        }
        let max_width = (area.width / 2).clamp(30.min(area.width), 70);
        let mut y = area.y + area.height - 1;
        for toast in self.toasts.iter().rev() {
            let text = format!(" {} {} ", toast.severity.icon(), toast.message);
            let w = (text.chars().count() as u16).min(max_width);
            let rect = Rect {
                x: area.x + area.width.saturating_sub(w + 1),
                y,
                width: w,
                height: 1,
            };
            frame.render_widget(Clear, rect);
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    text,
                    Style::default()
                        .fg(toast.severity.color())
                        .add_modifier(Modifier::BOLD),
                ))),
                rect,
            );
            if y == area.y {
                break;
            }
            y -= 1;
        }
    }
}

impl Default for ToastManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_collapse() {
        let mut t = ToastManager::new();
        t.error("Forbidden");
        t.error("Forbidden");
        assert_eq!(t.toasts.len(), 1);
    }

    #[test]
    fn test_queue_is_capped() {
        let mut t = ToastManager::new();
        for i in 0..10 {
            t.push(format!("n{}", i), Severity::Info);
        }
        assert_eq!(t.toasts.len(), 4);
        assert_eq!(t.toasts.back().map(|t| t.message.as_str()), Some("n9"));
    }
}
