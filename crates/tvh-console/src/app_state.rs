//! AppState — shared read-only data passed to all components during render/event.
//!
//! Components read this for guide and grid data, but never mutate it.
//! The App event-loop is the only thing that writes to AppState.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use tvh_proto::autorec::AutoRecPreview;
use tvh_proto::browser::EpgBrowser;
use tvh_proto::catalog::Catalogs;
use tvh_proto::detail::EventDetail;
use tvh_proto::idnode::{GridPage, GridResource};

use crate::action::Workspace;
use crate::widgets::status_bar::InputMode;

/// Rows and load status of the selected configuration grid.
#[derive(Debug)]
pub struct ConfigGridState {
    pub resources: Vec<GridResource>,
    pub selected: usize,
    pub page: GridPage,
    pub loading: bool,
    pub error: Option<String>,
}

impl ConfigGridState {
    pub fn new() -> Self {
        Self {
            resources: GridResource::all(),
            selected: 0,
            page: GridPage::default(),
            loading: false,
            error: None,
        }
    }

    pub fn resource(&self) -> GridResource {
        self.resources
            .get(self.selected)
            .copied()
            .unwrap_or(GridResource::ChannelTag)
    }
}

impl Default for ConfigGridState {
    fn default() -> Self {
        Self::new()
    }
}

pub struct AppState {
    pub browser: EpgBrowser,
    /// Swapped wholesale on every catalog refresh.
    pub catalogs: Arc<Catalogs>,
    pub detail: Option<EventDetail>,
    pub autorec: Option<AutoRecPreview>,
    pub grid: ConfigGridState,

    /// Wall clock used for airing-now emphasis; advanced on every UI tick.
    pub now: DateTime<Utc>,
    pub workspace: Workspace,
    pub input_mode: InputMode,
    pub show_end_column: bool,
    pub server: String,
}
