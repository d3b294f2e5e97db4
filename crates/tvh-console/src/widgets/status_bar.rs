//! Status bar — query position, active filters, mode and keybindings.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use tvh_proto::catalog::{self, Catalogs};
use tvh_proto::filter::FilterState;

use crate::action::Workspace;
use crate::theme::{
    C_BUFFERING, C_ERROR, C_FILTER_FG, C_MODE_DIALOG, C_MODE_FILTER, C_MODE_NORMAL, C_MUTED,
    C_PRIMARY, C_SECONDARY, C_SEPARATOR,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Filter,
    Dialog,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Filter => "FILTER",
            Self::Dialog => "DIALOG",
        }
    }

    pub fn color(self) -> ratatui::style::Color {
        match self {
            Self::Normal => C_MODE_NORMAL,
            Self::Filter => C_MODE_FILTER,
            Self::Dialog => C_MODE_DIALOG,
        }
    }
}

/// `"rows 1-23 of 4211"`, or `"no rows"` for an empty result.
pub fn range_label(offset: usize, visible: usize, total: usize) -> String {
    if total == 0 {
        return "no rows".to_string();
    }
    let first = offset.min(total - 1) + 1;
    let last = (offset + visible).min(total).max(first);
    format!("rows {}-{} of {}", first, last, total)
}

/// One short fragment per active predicate, names resolved through the
/// catalogs.
pub fn filter_summary(filter: &FilterState, catalogs: &Catalogs) -> Vec<String> {
    let mut parts = Vec::new();
    if let Some(title) = filter.title() {
        parts.push(format!("title~{}", title));
    }
    if let Some(key) = filter.channel() {
        parts.push(format!("ch={}", catalogs.channel_label(key)));
    }
    if let Some(tag) = filter.tag() {
        parts.push(format!("tag={}", tag));
    }
    if let Some(code) = filter.content_type() {
        parts.push(format!("genre={}", catalogs.content_group_label(code)));
    }
    let range = filter.duration();
    if !range.is_full() {
        parts.push(format!(
            "dur={}..{}",
            catalog::bucket(range.min).label,
            catalog::bucket(range.max).label
        ));
    }
    parts
}

/// Query position, loading indicator and filter summary (one row).
pub fn draw_query_bar(
    frame: &mut Frame,
    area: Rect,
    position: &str,
    loading: bool,
    error: Option<&str>,
    filters: &[String],
) {
    let mut spans = vec![Span::styled(
        format!(" {} ", position),
        Style::default().fg(C_PRIMARY),
    )];
    if loading {
        spans.push(Span::styled(
            "Buffering… ",
            Style::default().fg(C_BUFFERING).add_modifier(Modifier::BOLD),
        ));
    }
    if let Some(err) = error {
        spans.push(Span::styled(format!("✗ {} ", err), Style::default().fg(C_ERROR)));
    }
    if !filters.is_empty() {
        spans.push(Span::styled("│ ", Style::default().fg(C_SEPARATOR)));
        spans.push(Span::styled(
            filters.join("  "),
            Style::default().fg(C_FILTER_FG),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draw the keybindings footer bar (one row).
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: InputMode, workspace: Workspace, server: &str) {
    let label = match (mode, workspace) {
        (InputMode::Normal, Workspace::Epg) => "EPG",
        (InputMode::Normal, Workspace::Config) => "CONFIG",
        (other, _) => other.label(),
    };

    let keys = match mode {
        InputMode::Normal => match workspace {
            Workspace::Epg => {
                " ↑↓ select  Enter details  / title  c/t/g channel/tag/genre  [ ] { } duration  x reset  r reload  A autorec  e end  2 config  ? help  q quit"
            }
            Workspace::Config => {
                " ←→ resource  ↑↓ select  a add  d delete  u/n move  r reload  1 epg  ? help  q quit"
            }
        },
        InputMode::Filter => " type text  Enter apply  Esc cancel",
        InputMode::Dialog => " y confirm  n/Esc cancel",
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", label),
            Style::default().fg(mode.color()).add_modifier(Modifier::BOLD),
        ),
        Span::styled(keys, Style::default().fg(C_MUTED)),
        Span::styled(format!("  {}", server), Style::default().fg(C_SECONDARY)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_label() {
        assert_eq!(range_label(0, 20, 0), "no rows");
        assert_eq!(range_label(0, 20, 4211), "rows 1-20 of 4211");
        assert_eq!(range_label(4200, 20, 4211), "rows 4201-4211 of 4211");
        assert_eq!(range_label(0, 20, 5), "rows 1-5 of 5");
    }

    #[test]
    fn test_filter_summary_lists_active_predicates() {
        let mut f = FilterState::new();
        assert!(filter_summary(&f, &Catalogs::default()).is_empty());
        f.set_title(Some("News"));
        f.set_content_type(Some(0x40));
        f.set_duration_range(1, 3);
        assert_eq!(
            filter_summary(&f, &Catalogs::default()),
            vec!["title~News", "genre=0x40", "dur=20 min..90 min"]
        );
    }
}
