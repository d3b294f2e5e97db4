//! App — component-based event loop.
//!
//! Architecture:
//! - `App` owns all components and `AppState` (shared read-only data for components).
//! - A `tokio::mpsc` channel carries `AppMessage` events in from background tasks.
//! - The event loop draws each frame, then awaits the next message.
//! - Components return `Vec<Action>`; App dispatches each Action.
//! - Every network call runs in its own task and reports back as an `AppMessage`;
//!   the EPG query itself never performs I/O.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use tvh_proto::browser::EpgBrowser;
use tvh_proto::catalog::{Catalogs, LAST_BUCKET};
use tvh_proto::client::{ClientError, TvhClient};
use tvh_proto::config::Config;
use tvh_proto::detail::EventDetail;
use tvh_proto::idnode::{GridPage, GridResource};
use tvh_proto::model::{AlternativeBroadcast, EpgPage, RecordOp, RelatedEpisode};
use tvh_proto::query::{FetchRequest, Outcome};

use crate::{
    action::{Action, ComponentId, PickerKind, Thumb, Workspace},
    app_state::{AppState, ConfigGridState},
    component::Component,
    components::{
        autorec_dialog::AutoRecDialog, config_grid::ConfigGrid, epg_grid::EpgGrid,
        event_detail::EventDetailView, filter_bar::FilterBar, help_overlay::HelpOverlay,
        picker::Picker,
    },
    widgets::{
        status_bar::{self, InputMode},
        toast::ToastManager,
    },
    workspace::WorkspaceManager,
};

/// Rows requested per configuration grid page.
const GRID_PAGE_ROWS: usize = 500;

// ── Internal event bus ────────────────────────────────────────────────────────

enum AppMessage {
    Event(Event),
    EpgPage(FetchRequest, Result<EpgPage, String>),
    Catalogs(Catalogs),
    Alternatives(u64, Vec<AlternativeBroadcast>),
    Related(u64, Vec<RelatedEpisode>),
    Recorded(u64, RecordOp, Result<(), ClientError>),
    AutoRecCreated(Result<(), ClientError>),
    GridLoaded(GridResource, Result<GridPage, ClientError>),
    GridChanged(&'static str, Result<(), ClientError>),
}

pub struct App {
    client: TvhClient,
    config: Config,
    state: AppState,
    wm: WorkspaceManager,
    toast: ToastManager,

    // ── Components ────────────────────────────────────────────────────────────
    filter_bar: FilterBar,
    epg_grid: EpgGrid,
    config_grid: ConfigGrid,
    picker: Picker,
    event_detail: EventDetailView,
    autorec_dialog: AutoRecDialog,
    help_overlay: HelpOverlay,

    tx: mpsc::Sender<AppMessage>,
    rx: Option<mpsc::Receiver<AppMessage>>,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config, client: TvhClient) -> Self {
        let (tx, rx) = mpsc::channel::<AppMessage>(1024);
        let state = AppState {
            browser: EpgBrowser::new(&config.epg),
            catalogs: Arc::new(Catalogs::default()),
            detail: None,
            autorec: None,
            grid: ConfigGridState::new(),
            now: Utc::now(),
            workspace: Workspace::Epg,
            input_mode: InputMode::Normal,
            show_end_column: config.ui.show_end_column,
            server: client.base_url().to_string(),
        };
        Self {
            client,
            config,
            state,
            wm: WorkspaceManager::new(),
            toast: ToastManager::new(),
            filter_bar: FilterBar::new(),
            epg_grid: EpgGrid::new(),
            config_grid: ConfigGrid::new(),
            picker: Picker::new(),
            event_detail: EventDetailView::new(),
            autorec_dialog: AutoRecDialog::new(),
            help_overlay: HelpOverlay::new(),
            tx,
            rx: Some(rx),
            should_quit: false,
        }
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut rx = self.rx.take().context("event loop already started")?;

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        // ── Background task: keyboard events ──────────────────────────────────
        let event_tx = self.tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        self.spawn_catalog_load();
        let first = self.state.browser.start();
        self.spawn_fetches(vec![first]);

        let mut ui_tick =
            tokio::time::interval(Duration::from_millis(self.config.ui.tick_ms.max(100)));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let catalog_period = Duration::from_secs(self.config.epg.catalog_refresh_secs.max(10));
        let mut catalog_refresh =
            tokio::time::interval_at(tokio::time::Instant::now() + catalog_period, catalog_period);

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
                self.sync_window();
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    const MAX_DRAIN: usize = 256;
                    let mut redraw = self.handle_message(msg);
                    let mut drained = 0usize;
                    while drained < MAX_DRAIN {
                        match rx.try_recv() {
                            Ok(next) => redraw |= self.handle_message(next),
                            Err(_) => break,
                        }
                        drained += 1;
                    }
                    needs_redraw = redraw;
                }

                _ = ui_tick.tick() => {
                    // Airing-now emphasis is a function of the clock.
                    self.state.now = Utc::now();
                    self.toast.tick();
                    needs_redraw = true;
                }

                _ = catalog_refresh.tick() => {
                    self.spawn_catalog_load();
                }
            }

            if self.should_quit {
                break;
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        info!("tvhc exiting");
        Ok(())
    }

    /// Returns `true` if the message requires a redraw.
    fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(ev) => match ev {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        return false;
                    }
                    for action in self.handle_key(key) {
                        self.dispatch(action);
                    }
                    self.sync_input_mode();
                }
                Event::Resize(..) => {}
                _ => return false,
            },

            AppMessage::EpgPage(request, result) => {
                match self.state.browser.complete(&request, result) {
                    Outcome::Applied { rows } => {
                        debug!("[epg] applied {} rows through v{}", rows, request.version)
                    }
                    Outcome::Deferred => return false,
                    Outcome::Stale => return false,
                    // Background fetches fail quietly; the previous window stays.
                    Outcome::Failed(e) => {
                        warn!("[epg] rows {}..{} failed: {}", request.start, request.end(), e)
                    }
                }
            }

            AppMessage::Catalogs(catalogs) => {
                self.state.catalogs = Arc::new(catalogs);
            }

            AppMessage::Alternatives(event_id, entries) => {
                let accepted = self
                    .state
                    .detail
                    .as_mut()
                    .is_some_and(|d| d.accept_alternatives(event_id, entries));
                if !accepted {
                    debug!("[detail] dropped alternatives for closed event {}", event_id);
                }
                return accepted;
            }

            AppMessage::Related(event_id, entries) => {
                let accepted = self
                    .state
                    .detail
                    .as_mut()
                    .is_some_and(|d| d.accept_related(event_id, entries));
                if !accepted {
                    debug!("[detail] dropped related episodes for closed event {}", event_id);
                }
                return accepted;
            }

            AppMessage::Recorded(event_id, op, result) => {
                let open = self
                    .state
                    .detail
                    .as_ref()
                    .is_some_and(|d| d.event_id() == event_id);
                if open {
                    if let Some(d) = self.state.detail.as_mut() {
                        d.pending = None;
                    }
                }
                match result {
                    Ok(()) => {
                        info!("[dvr] {} for event {} accepted", op.as_str(), event_id);
                        self.toast.success("Scheduled for recording");
                        if open {
                            self.state.detail = None;
                        }
                    }
                    Err(e) => {
                        warn!("[dvr] {} for event {} failed: {}", op.as_str(), event_id, e);
                        self.toast.error(format!("Failed to record: {}", e.status_text()));
                    }
                }
                self.sync_input_mode();
            }

            AppMessage::AutoRecCreated(result) => {
                // Rule creation is fire-and-forget; only the log hears about it.
                match result {
                    Ok(()) => info!("[dvr] auto-record rule created"),
                    Err(e) => warn!("[dvr] auto-record rule failed: {}", e),
                }
                return false;
            }

            AppMessage::GridLoaded(resource, result) => {
                if resource != self.state.grid.resource() {
                    return false;
                }
                let grid = &mut self.state.grid;
                grid.loading = false;
                match result {
                    Ok(page) => {
                        debug!("[config] {} rows of {}", page.entries.len(), resource.url());
                        grid.page = page;
                        grid.error = None;
                    }
                    Err(e) => {
                        warn!("[config] load {} failed: {}", resource.url(), e);
                        grid.error = Some(e.status_text());
                        self.toast.error(format!(
                            "Loading {} failed: {}",
                            resource.title_plural(),
                            e.status_text()
                        ));
                    }
                }
            }

            AppMessage::GridChanged(what, result) => match result {
                Ok(()) => {
                    self.toast.success(what);
                    self.load_grid();
                }
                Err(e) => {
                    warn!("[config] {} failed: {}", what, e);
                    self.toast.error(format!("{} failed: {}", what, e.status_text()));
                }
            },
        }
        true
    }

    // ── Key routing ───────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return vec![Action::Quit];
        }

        // Modal layers, topmost first.
        if self.wm.show_help {
            return self.help_overlay.handle_key(key, &self.state);
        }
        if self.state.autorec.is_some() {
            return self.autorec_dialog.handle_key(key, &self.state);
        }
        if self.picker.is_open() {
            return self.picker.handle_key(key, &self.state);
        }
        if self.filter_bar.is_editing() {
            return self.filter_bar.handle_key(key, &self.state);
        }
        if self.state.detail.is_some() {
            return self.event_detail.handle_key(key, &self.state);
        }

        match key.code {
            KeyCode::Char('q') => return vec![Action::Quit],
            KeyCode::Char('?') => return vec![Action::ToggleHelp],
            KeyCode::Char('K') => return vec![Action::ToggleKeys],
            KeyCode::Char('1') => return vec![Action::SwitchWorkspace(Workspace::Epg)],
            KeyCode::Char('2') => return vec![Action::SwitchWorkspace(Workspace::Config)],
            _ => {}
        }

        match self.wm.workspace {
            Workspace::Epg => match key.code {
                KeyCode::Char('/') => vec![Action::OpenTitleFilter],
                KeyCode::Char('c') => vec![Action::OpenPicker(PickerKind::Channel)],
                KeyCode::Char('t') => vec![Action::OpenPicker(PickerKind::Tag)],
                KeyCode::Char('g') => vec![Action::OpenPicker(PickerKind::ContentGroup)],
                KeyCode::Char('[') => vec![Action::MoveThumb(Thumb::Min, -1)],
                KeyCode::Char(']') => vec![Action::MoveThumb(Thumb::Min, 1)],
                KeyCode::Char('{') => vec![Action::MoveThumb(Thumb::Max, -1)],
                KeyCode::Char('}') => vec![Action::MoveThumb(Thumb::Max, 1)],
                KeyCode::Char('x') => vec![Action::ClearFilters],
                KeyCode::Char('r') => vec![Action::Refresh],
                KeyCode::Char('A') => vec![Action::PromptAutoRec],
                KeyCode::Char('e') => vec![Action::ToggleEndColumn],
                _ => self.epg_grid.handle_key(key, &self.state),
            },
            Workspace::Config => self.config_grid.handle_key(key, &self.state),
        }
    }

    // ── Action dispatch ───────────────────────────────────────────────────────

    fn dispatch(&mut self, action: Action) {
        let follow_ups: Vec<Action> = {
            let s = &self.state;
            let mut all = Vec::new();
            all.extend(self.filter_bar.on_action(&action, s));
            all.extend(self.picker.on_action(&action, s));
            all.extend(self.event_detail.on_action(&action, s));
            all
        };
        self.apply_action(action);
        for a in follow_ups {
            self.dispatch(a);
        }
    }

    fn apply_action(&mut self, action: Action) {
        match action {
            // Handled by the components themselves.
            Action::OpenTitleFilter | Action::OpenPicker(_) | Action::ClosePicker => {}

            Action::SetTitle(title) => {
                let req = self.state.browser.set_title(title.as_deref());
                self.spawn_fetches(req.into_iter().collect());
            }
            Action::SetChannel(key) => {
                let req = self.state.browser.set_channel(key.as_deref());
                self.spawn_fetches(req.into_iter().collect());
            }
            Action::SetTag(name) => {
                let req = self.state.browser.set_tag(name.as_deref());
                self.spawn_fetches(req.into_iter().collect());
            }
            Action::SetContentType(code) => {
                let req = self.state.browser.set_content_type(code);
                self.spawn_fetches(req.into_iter().collect());
            }
            Action::MoveThumb(thumb, delta) => {
                let range = self.state.browser.filter().duration();
                let step = |v: usize, lo: usize, hi: usize| {
                    (v as isize + delta as isize).clamp(lo as isize, hi as isize) as usize
                };
                // Thumbs may meet but never cross.
                let (min, max) = match thumb {
                    Thumb::Min => (step(range.min, 0, range.max), range.max),
                    Thumb::Max => (range.min, step(range.max, range.min, LAST_BUCKET)),
                };
                let req = self.state.browser.set_duration_range(min, max);
                self.spawn_fetches(req.into_iter().collect());
            }
            Action::ClearFilters => {
                let req = self.state.browser.clear_all();
                self.spawn_fetches(vec![req]);
            }
            Action::Refresh => {
                let req = self.state.browser.refresh();
                self.spawn_fetches(vec![req]);
            }

            Action::OpenDetail(event) => {
                let event_id = event.id;
                self.state.detail = Some(EventDetail::new(*event));
                self.spawn_related(event_id);
            }
            Action::Record(op) => self.record(op),
            Action::SetDvrConfig(name) => {
                if let Some(d) = self.state.detail.as_mut() {
                    d.config_name = name;
                }
            }
            Action::CloseDetail => self.state.detail = None,

            Action::PromptAutoRec => {
                self.state.autorec = Some(self.state.browser.auto_record_preview(&self.state.catalogs));
            }
            Action::ConfirmAutoRec(confirmed) => {
                let params = self.state.autorec.take().and_then(|p| p.decide(confirmed));
                if let Some(params) = params {
                    let client = self.client.clone();
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let result = client.create_autorec(&params).await;
                        let _ = tx.send(AppMessage::AutoRecCreated(result)).await;
                    });
                }
            }

            Action::SelectGrid(idx) => {
                if idx < self.state.grid.resources.len() {
                    self.state.grid.selected = idx;
                    self.state.grid.page = GridPage::default();
                    self.load_grid();
                }
            }
            Action::GridAdd => {
                let resource = self.state.grid.resource();
                self.spawn_grid_change("Created", move |client| async move {
                    client.create_node(resource).await
                });
            }
            Action::GridDelete(uuid) => {
                self.spawn_grid_change("Deleted", move |client| async move {
                    client.delete_node(&uuid).await
                });
            }
            Action::GridMove(uuid, up) => {
                self.spawn_grid_change("Moved", move |client| async move {
                    client.move_node(&uuid, up).await
                });
            }
            Action::GridRefresh => self.load_grid(),

            Action::SwitchWorkspace(workspace) => {
                self.wm.switch_to(workspace);
                self.state.workspace = workspace;
                let grid = &self.state.grid;
                if workspace == Workspace::Config && grid.page.entries.is_empty() && !grid.loading {
                    self.load_grid();
                }
            }
            Action::ToggleHelp => self.wm.show_help = !self.wm.show_help,
            Action::ToggleEndColumn => self.state.show_end_column = !self.state.show_end_column,
            Action::ToggleKeys => self.wm.show_keys_bar = !self.wm.show_keys_bar,
            Action::Quit => self.should_quit = true,
        }
    }

    fn sync_input_mode(&mut self) {
        self.state.input_mode = if self.filter_bar.is_editing() || self.picker.is_open() {
            InputMode::Filter
        } else if self.state.autorec.is_some() || self.state.detail.is_some() {
            InputMode::Dialog
        } else {
            InputMode::Normal
        };
    }

    // ── Background work ───────────────────────────────────────────────────────

    fn spawn_fetches(&self, requests: Vec<FetchRequest>) {
        for request in requests {
            let client = self.client.clone();
            let tx = self.tx.clone();
            tokio::spawn(async move {
                let result = client.fetch_epg(&request).await.map_err(|e| e.to_string());
                let _ = tx.send(AppMessage::EpgPage(request, result)).await;
            });
        }
    }

    /// Cover whatever the grid drew last frame.
    fn sync_window(&mut self) {
        if self.wm.workspace != Workspace::Epg {
            return;
        }
        let (offset, rows) = self.epg_grid.viewport();
        if rows == 0 {
            return;
        }
        let requests = self.state.browser.ensure_window(offset, rows);
        self.spawn_fetches(requests);
    }

    fn spawn_catalog_load(&self) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let catalogs = Catalogs::load(&client).await;
            let _ = tx.send(AppMessage::Catalogs(catalogs)).await;
        });
    }

    /// Both side panels load independently; either may never arrive.
    fn spawn_related(&self, event_id: u64) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            match client.alternatives(event_id).await {
                Ok(entries) => {
                    let _ = tx.send(AppMessage::Alternatives(event_id, entries)).await;
                }
                Err(e) => debug!("[detail] alternatives for {} failed: {}", event_id, e),
            }
        });
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            match client.related(event_id).await {
                Ok(entries) => {
                    let _ = tx.send(AppMessage::Related(event_id, entries)).await;
                }
                Err(e) => debug!("[detail] related for {} failed: {}", event_id, e),
            }
        });
    }

    fn record(&mut self, op: RecordOp) {
        let Some(detail) = self.state.detail.as_mut() else {
            return;
        };
        detail.pending = Some(op);
        let event_id = detail.event_id();
        let config_name = detail.config_name.clone();
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.record(op, event_id, &config_name).await;
            let _ = tx.send(AppMessage::Recorded(event_id, op, result)).await;
        });
    }

    fn load_grid(&mut self) {
        let resource = self.state.grid.resource();
        self.state.grid.loading = true;
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.grid(resource, 0, GRID_PAGE_ROWS).await;
            let _ = tx.send(AppMessage::GridLoaded(resource, result)).await;
        });
    }

    fn spawn_grid_change<F, Fut>(&self, what: &'static str, op: F)
    where
        F: FnOnce(TvhClient) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Result<(), ClientError>> + Send + 'static,
    {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = op(client).await;
            let _ = tx.send(AppMessage::GridChanged(what, result)).await;
        });
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        let area = frame.area();
        let keys_h = if self.wm.show_keys_bar { 1u16 } else { 0 };

        let body_area = match self.wm.workspace {
            Workspace::Epg => {
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(2),
                        Constraint::Min(0),
                        Constraint::Length(1),
                        Constraint::Length(keys_h),
                    ])
                    .split(area);
                self.filter_bar.draw(frame, rows[0], false, &self.state);
                let focused =
                    self.wm.focused() == ComponentId::EpgGrid && self.state.detail.is_none();
                self.epg_grid.draw(frame, rows[1], focused, &self.state);
                self.draw_query_bar(frame, rows[2]);
                self.draw_keys(frame, rows[3]);
                rows[1]
            }
            Workspace::Config => {
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(keys_h)])
                    .split(area);
                let focused = self.wm.focused() == ComponentId::ConfigGrid;
                self.config_grid.draw(frame, rows[0], focused, &self.state);
                self.draw_keys(frame, rows[1]);
                rows[0]
            }
        };

        // ── Overlays ──────────────────────────────────────────────────────────
        self.event_detail.draw(frame, body_area, true, &self.state);
        self.picker.draw(frame, body_area, true, &self.state);
        self.autorec_dialog.draw(frame, body_area, true, &self.state);
        if self.wm.show_help {
            self.help_overlay.draw(frame, area, false, &self.state);
        }
        self.toast.draw(frame, body_area);
    }

    fn draw_query_bar(&self, frame: &mut ratatui::Frame, area: Rect) {
        let query = self.state.browser.query();
        let (offset, rows) = self.epg_grid.viewport();
        let position = status_bar::range_label(offset, rows, query.total_count());
        let filters = status_bar::filter_summary(self.state.browser.filter(), &self.state.catalogs);
        status_bar::draw_query_bar(
            frame,
            area,
            &position,
            query.loading(),
            query.last_error(),
            &filters,
        );
    }

    fn draw_keys(&self, frame: &mut ratatui::Frame, area: Rect) {
        if area.height == 0 {
            return;
        }
        status_bar::draw_keys_bar(
            frame,
            area,
            self.state.input_mode,
            self.wm.workspace,
            &self.state.server,
        );
    }
}
