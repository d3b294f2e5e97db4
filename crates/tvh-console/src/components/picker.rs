//! Picker — popup list standing in for the channel, tag, genre and DVR
//! profile combo boxes.  Typing narrows the list; Enter applies.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use tvh_proto::catalog::Catalogs;

use crate::{
    action::{Action, ComponentId, PickerKind},
    app_state::AppState,
    component::Component,
    theme::{style_selected, C_MUTED, C_PRIMARY},
    widgets::{
        filter_input::{FilterAction, FilterInput},
        pane_chrome::pane_chrome,
        scrollable_list::ScrollableList,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerItem {
    pub label: String,
    /// `None` clears the predicate.
    pub value: Option<String>,
}

impl PickerItem {
    fn new(label: impl Into<String>, value: Option<String>) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Choices for `kind`, "no selection" first.
pub fn picker_items(kind: PickerKind, catalogs: &Catalogs) -> Vec<PickerItem> {
    let mut items = Vec::new();
    match kind {
        PickerKind::Channel => {
            items.push(PickerItem::new("(any)", None));
            items.extend(
                catalogs
                    .channels
                    .iter()
                    .map(|c| PickerItem::new(c.val.clone(), Some(c.key.clone()))),
            );
        }
        PickerKind::Tag => {
            items.push(PickerItem::new("(any)", None));
            items.extend(
                catalogs
                    .tags
                    .iter()
                    .map(|t| PickerItem::new(t.name.clone(), Some(t.name.clone()))),
            );
        }
        PickerKind::ContentGroup => {
            items.push(PickerItem::new("(any)", None));
            items.extend(
                catalogs
                    .content_groups
                    .iter()
                    .map(|g| PickerItem::new(g.name.clone(), Some(g.code.to_string()))),
            );
        }
        PickerKind::DvrConfig => {
            if !catalogs.config_names.iter().any(|c| c.identifier.is_empty()) {
                items.push(PickerItem::new("(default)", Some(String::new())));
            }
            items.extend(catalogs.config_names.iter().map(|c| {
                PickerItem::new(catalogs.config_label(&c.identifier), Some(c.identifier.clone()))
            }));
        }
    }
    items
}

/// The action applying `item` for `kind`.
pub fn choose(kind: PickerKind, item: &PickerItem) -> Action {
    let value = item.value.clone();
    match kind {
        PickerKind::Channel => Action::SetChannel(value),
        PickerKind::Tag => Action::SetTag(value),
        PickerKind::ContentGroup => {
            Action::SetContentType(value.and_then(|v| v.parse::<u32>().ok()))
        }
        PickerKind::DvrConfig => Action::SetDvrConfig(value.unwrap_or_default()),
    }
}

fn current_value(kind: PickerKind, state: &AppState) -> Option<String> {
    let filter = state.browser.filter();
    match kind {
        PickerKind::Channel => filter.channel().map(str::to_string),
        PickerKind::Tag => filter.tag().map(str::to_string),
        PickerKind::ContentGroup => filter.content_type().map(|c| c.to_string()),
        PickerKind::DvrConfig => state.detail.as_ref().map(|d| d.config_name.clone()),
    }
}

pub struct Picker {
    kind: Option<PickerKind>,
    list: ScrollableList<PickerItem>,
    search: FilterInput,
    height: usize,
}

impl Picker {
    pub fn new() -> Self {
        Self {
            kind: None,
            list: ScrollableList::new(|item: &PickerItem, q: &str| {
                item.label.to_lowercase().contains(&q.to_lowercase())
            }),
            search: FilterInput::new("› ", "type to narrow"),
            height: 10,
        }
    }

    pub fn is_open(&self) -> bool {
        self.kind.is_some()
    }

    fn open(&mut self, kind: PickerKind, state: &AppState) {
        self.kind = Some(kind);
        self.list.set_items(picker_items(kind, &state.catalogs));
        let current = current_value(kind, state);
        self.list.select_where(|item| item.value == current);
        self.search.activate("");
    }

    fn close(&mut self) {
        self.kind = None;
        self.search.deactivate();
    }

    fn title(kind: PickerKind) -> &'static str {
        match kind {
            PickerKind::Channel => "Filter channel",
            PickerKind::Tag => "Filter tag",
            PickerKind::ContentGroup => "Filter content type",
            PickerKind::DvrConfig => "DVR configuration",
        }
    }
}

impl Default for Picker {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Picker {
    fn id(&self) -> ComponentId {
        ComponentId::Picker
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let Some(kind) = self.kind else {
            return vec![];
        };
        match key.code {
            KeyCode::Up => self.list.select_up(1),
            KeyCode::Down => self.list.select_down(1),
            KeyCode::PageUp => self.list.select_up(self.height),
            KeyCode::PageDown => self.list.select_down(self.height),
            KeyCode::Esc => {
                self.close();
                return vec![Action::ClosePicker];
            }
            KeyCode::Enter => {
                let chosen = self.list.selected_item().map(|item| choose(kind, item));
                self.close();
                return chosen
                    .into_iter()
                    .chain(std::iter::once(Action::ClosePicker))
                    .collect();
            }
            _ => {
                if let FilterAction::Edited(q) = self.search.handle_key(key) {
                    self.list.set_filter(&q);
                }
            }
        }
        self.list.ensure_visible(self.height);
        vec![]
    }

    fn on_action(&mut self, action: &Action, state: &AppState) -> Vec<Action> {
        if let Action::OpenPicker(kind) = action {
            self.open(*kind, state);
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, _state: &AppState) {
        let Some(kind) = self.kind else {
            return;
        };
        let width = 44.min(area.width);
        let height = 18.min(area.height);
        let popup = Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        };
        frame.render_widget(Clear, popup);
        let block = pane_chrome(Self::title(kind), true, None);
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(inner);
        self.search.draw(frame, parts[0]);

        self.height = parts[1].height as usize;
        self.list.ensure_visible(self.height);
        let lines: Vec<Line> = if self.list.is_empty() {
            vec![Line::from(Span::styled(" no matches", Style::default().fg(C_MUTED)))]
        } else {
            self.list
                .visible_items(self.height)
                .into_iter()
                .map(|(pos, item)| {
                    let style = if pos == self.list.selected {
                        style_selected()
                    } else if item.value.is_none() {
                        Style::default().fg(C_MUTED)
                    } else {
                        Style::default().fg(C_PRIMARY)
                    };
                    Line::from(Span::styled(format!(" {}", item.label), style))
                })
                .collect()
        };
        frame.render_widget(Paragraph::new(lines), parts[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvh_proto::model::{ChannelEntry, ConfigName, ContentGroup};

    fn catalogs() -> Catalogs {
        Catalogs::new(
            vec![ChannelEntry {
                key: "5".into(),
                val: "Arte".into(),
            }],
            Vec::new(),
            vec![ContentGroup {
                name: "Sports".into(),
                code: 0x40,
            }],
            vec![ConfigName {
                identifier: "abc".into(),
                name: "HD profile".into(),
            }],
        )
    }

    #[test]
    fn test_any_comes_first() {
        let items = picker_items(PickerKind::Channel, &catalogs());
        assert_eq!(items[0].value, None);
        assert_eq!(items[1], PickerItem::new("Arte", Some("5".into())));
    }

    #[test]
    fn test_dvr_configs_offer_default_profile() {
        let items = picker_items(PickerKind::DvrConfig, &catalogs());
        assert_eq!(items[0].label, "(default)");
        assert_eq!(items[0].value.as_deref(), Some(""));
        assert_eq!(items[1].label, "HD profile");
    }

    #[test]
    fn test_choose_maps_to_setter() {
        let items = picker_items(PickerKind::ContentGroup, &catalogs());
        assert!(matches!(
            choose(PickerKind::ContentGroup, &items[1]),
            Action::SetContentType(Some(0x40))
        ));
        assert!(matches!(
            choose(PickerKind::ContentGroup, &items[0]),
            Action::SetContentType(None)
        ));
    }
}
