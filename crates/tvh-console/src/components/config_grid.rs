//! ConfigGrid — the Config workspace: one idnode table at a time (channel
//! tags, bouquets, stream filters) with add, delete and reorder.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};

use tvh_proto::idnode::{cell_text, row_uuid};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{
        style_header, style_selected, C_ACCENT, C_BUFFERING, C_ERROR, C_MUTED, C_PRIMARY,
        C_SEPARATOR,
    },
    widgets::pane_chrome::{pane_chrome, Badge},
};

pub struct ConfigGrid {
    selected: usize,
    scroll_offset: usize,
    viewport_rows: usize,
    shown_resource: usize,
}

impl ConfigGrid {
    pub fn new() -> Self {
        Self {
            selected: 0,
            scroll_offset: 0,
            viewport_rows: 0,
            shown_resource: 0,
        }
    }

    fn follow_resource(&mut self, state: &AppState) {
        if state.grid.selected != self.shown_resource {
            self.shown_resource = state.grid.selected;
            self.selected = 0;
            self.scroll_offset = 0;
        }
    }

    fn selected_uuid(&self, state: &AppState) -> Option<String> {
        state
            .grid
            .page
            .entries
            .get(self.selected)
            .and_then(row_uuid)
            .map(str::to_string)
    }

    fn clamp(&mut self, rows: usize) {
        self.selected = self.selected.min(rows.saturating_sub(1));
        if self.viewport_rows == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + self.viewport_rows {
            self.scroll_offset = self.selected + 1 - self.viewport_rows;
        }
    }
}

impl Default for ConfigGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for ConfigGrid {
    fn id(&self) -> ComponentId {
        ComponentId::ConfigGrid
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        self.follow_resource(state);
        let grid = &state.grid;
        let resource_count = grid.resources.len();
        let rows = grid.page.entries.len();
        let movable = grid.resource().movable();
        match key.code {
            KeyCode::Left | KeyCode::Char('h') if resource_count > 0 => {
                return vec![Action::SelectGrid(
                    (grid.selected + resource_count - 1) % resource_count,
                )];
            }
            KeyCode::Right | KeyCode::Char('l') if resource_count > 0 => {
                return vec![Action::SelectGrid((grid.selected + 1) % resource_count)];
            }
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.selected += 1,
            KeyCode::Char('a') => return vec![Action::GridAdd],
            KeyCode::Char('r') => return vec![Action::GridRefresh],
            KeyCode::Char('d') => {
                if let Some(uuid) = self.selected_uuid(state) {
                    return vec![Action::GridDelete(uuid)];
                }
            }
            KeyCode::Char('u') if movable => {
                if let Some(uuid) = self.selected_uuid(state) {
                    self.selected = self.selected.saturating_sub(1);
                    return vec![Action::GridMove(uuid, true)];
                }
            }
            KeyCode::Char('n') if movable => {
                if let Some(uuid) = self.selected_uuid(state) {
                    self.selected += 1;
                    self.clamp(rows);
                    return vec![Action::GridMove(uuid, false)];
                }
            }
            _ => {}
        }
        self.clamp(rows);
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        self.follow_resource(state);
        let grid = &state.grid;
        let resource = grid.resource();

        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(area);

        // Resource selector.
        let mut tabs = Vec::new();
        for (i, r) in grid.resources.iter().enumerate() {
            if i > 0 {
                tabs.push(Span::styled(" │ ", Style::default().fg(C_SEPARATOR)));
            }
            let style = if i == grid.selected {
                Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(C_MUTED)
            };
            tabs.push(Span::styled(r.title_plural(), style));
        }
        frame.render_widget(Paragraph::new(Line::from(tabs)), parts[0]);

        let title = resource.title_plural();
        let badge = if grid.loading {
            Some(Badge {
                text: "Loading…",
                color: C_BUFFERING,
            })
        } else {
            grid.error.as_deref().map(|e| Badge {
                text: e,
                color: C_ERROR,
            })
        };
        let block = pane_chrome(&title, focused, badge);
        let inner = block.inner(parts[1]);
        frame.render_widget(block, parts[1]);

        self.viewport_rows = inner.height.saturating_sub(1) as usize;
        let entries = &grid.page.entries;
        self.clamp(entries.len());

        let columns = resource.columns();
        let end = (self.scroll_offset + self.viewport_rows).min(entries.len());
        let rows: Vec<Row> = entries[self.scroll_offset.min(end)..end]
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let row = Row::new(
                    columns
                        .iter()
                        .map(|c| Cell::from(cell_text(entry, c)))
                        .collect::<Vec<_>>(),
                );
                if self.scroll_offset + i == self.selected && focused {
                    row.style(style_selected())
                } else {
                    row.style(Style::default().fg(C_PRIMARY))
                }
            })
            .collect();
        let widths: Vec<Constraint> = columns
            .iter()
            .map(|c| match *c {
                "enabled" | "rescan" | "internal" | "log" => Constraint::Length(8),
                "name" | "comment" | "service" | "source" => Constraint::Fill(2),
                _ => Constraint::Fill(1),
            })
            .collect();
        let table = Table::new(rows, widths)
            .header(Row::new(columns.to_vec()).style(style_header()))
            .column_spacing(1);
        frame.render_widget(table, inner);
    }
}
