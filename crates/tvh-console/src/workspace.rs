//! WorkspaceManager — EPG/Config tab switching and overlay visibility.
//!
//! Tracks:
//! - Which workspace is active (EPG = programme guide, Config = idnode grids)
//! - Which component has focus inside that workspace
//! - Whether the help overlay and the keys bar are shown

use crate::action::{ComponentId, Workspace};

pub struct WorkspaceManager {
    pub workspace: Workspace,
    pub show_help: bool,
    pub show_keys_bar: bool,
}

impl WorkspaceManager {
    pub fn new() -> Self {
        Self {
            workspace: Workspace::Epg,
            show_help: false,
            show_keys_bar: true,
        }
    }

    pub fn switch_to(&mut self, workspace: Workspace) {
        self.workspace = workspace;
    }

    /// The pane that receives unhandled keys in the active workspace.
    pub fn focused(&self) -> ComponentId {
        match self.workspace {
            Workspace::Epg => ComponentId::EpgGrid,
            Workspace::Config => ComponentId::ConfigGrid,
        }
    }
}

impl Default for WorkspaceManager {
    fn default() -> Self {
        Self::new()
    }
}
