//! Action enum — all user-initiated intents and internal events.

use tvh_proto::model::{Event, RecordOp};

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    FilterBar,
    EpgGrid,
    ConfigGrid,
    Picker,
    EventDetail,
    AutoRecDialog,
    HelpOverlay,
}

/// Which combo box a picker popup stands in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKind {
    Channel,
    Tag,
    ContentGroup,
    DvrConfig,
}

/// One of the two duration slider thumbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Thumb {
    Min,
    Max,
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Filters ──────────────────────────────────────────────────────────────
    OpenTitleFilter,
    SetTitle(Option<String>),
    OpenPicker(PickerKind),
    SetChannel(Option<String>),
    SetTag(Option<String>),
    SetContentType(Option<u32>),
    MoveThumb(Thumb, i8),
    ClearFilters,
    Refresh,

    // ── EPG grid ─────────────────────────────────────────────────────────────
    OpenDetail(Box<Event>),

    // ── Event detail ─────────────────────────────────────────────────────────
    Record(RecordOp),
    SetDvrConfig(String),
    CloseDetail,

    // ── Auto-record ──────────────────────────────────────────────────────────
    PromptAutoRec,
    ConfirmAutoRec(bool),

    // ── Config grids ─────────────────────────────────────────────────────────
    SelectGrid(usize),
    GridAdd,
    GridDelete(String),
    GridMove(String, bool),
    GridRefresh,

    // ── UI ───────────────────────────────────────────────────────────────────
    SwitchWorkspace(Workspace),
    ClosePicker,
    ToggleHelp,
    ToggleEndColumn,
    ToggleKeys,
    Quit,
}

/// Which workspace (tab) is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workspace {
    Epg,
    Config,
}
