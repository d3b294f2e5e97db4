//! Component trait — the interface every UI panel implements.
//!
//! - Components own their view state (selection, scroll, input buffers).
//! - Components receive `AppState` read-only for data they don't own.
//! - Components produce `Vec<Action>`; they never mutate shared state.
//! - The App event-loop dispatches those actions.

use ratatui::crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use crate::action::{Action, ComponentId};
use crate::app_state::AppState;

pub trait Component {
    fn id(&self) -> ComponentId;

    /// Handle a key event. Returns actions to be dispatched.
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action>;

    /// Receive an action dispatched by the App.
    fn on_action(&mut self, _action: &Action, _state: &AppState) -> Vec<Action> {
        Vec::new()
    }

    /// Render the component into `area`.
    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState);
}
