use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;

use crate::{App, AppState};

/// A UI Screen boundary: responsible for rendering and optional key handling
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
    /// Optional per-screen key handling. Returns true if the key was handled.
    fn on_key(&mut self, _key: KeyEvent, _app: &mut App) -> bool {
        false
    }
}

/// Play screen - targets, HUD and the pause menu
pub struct PlayScreen;

impl Screen for PlayScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// Statistics screen - history chart of one column
pub struct StatsScreen;

impl Screen for StatsScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(&app.stats_view, f.area());
    }

    fn on_key(&mut self, key: KeyEvent, app: &mut App) -> bool {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => app.stats_view.prev_column(),
            KeyCode::Right | KeyCode::Char('l') => app.stats_view.next_column(),
            KeyCode::Esc | KeyCode::Char('b') | KeyCode::Backspace => {
                app.state = AppState::Playing;
            }
            _ => return false,
        }
        true
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Playing => Box::new(PlayScreen),
        AppState::Stats => Box::new(StatsScreen),
    }
}
