//! Key bindings, pointer swipes and on-screen buttons, all normalised to `Action`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Command for the engine or the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Rotate,
    SoftDrop,
    Start,
    Pause,
    Restart,
    Quit,
    None,
}

/// Map key event to action. Supports both arrows and vim keys (hjkl).
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('s') | KeyCode::Enter => Action::Start,
        KeyCode::Char('p') | KeyCode::Char(' ') => Action::Pause,
        KeyCode::Char('r') => Action::Restart,
        KeyCode::Left | KeyCode::Char('h') => Action::MoveLeft,
        KeyCode::Right | KeyCode::Char('l') => Action::MoveRight,
        KeyCode::Up | KeyCode::Char('k') => Action::Rotate,
        KeyCode::Down | KeyCode::Char('j') => Action::SoftDrop,
        _ => Action::None,
    }
}

/// Swipe by dominant axis: horizontal moves, down drops, up (or a plain tap) rotates.
pub fn classify_swipe(dx: i32, dy: i32) -> Action {
    if dx.abs() > dy.abs() {
        if dx > 0 {
            Action::MoveRight
        } else {
            Action::MoveLeft
        }
    } else if dy > 0 {
        Action::SoftDrop
    } else {
        Action::Rotate
    }
}

/// Remembers where the pointer went down so the release can be turned into a gesture.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerTracker {
    down_at: Option<(u16, u16)>,
}

impl PointerTracker {
    pub fn press(&mut self, column: u16, row: u16) {
        self.down_at = Some((column, row));
    }

    /// Start position and displacement (dx, dy) of a completed press/release pair.
    pub fn release(&mut self, column: u16, row: u16) -> Option<((u16, u16), (i32, i32))> {
        let (x0, y0) = self.down_at.take()?;
        let dx = i32::from(column) - i32::from(x0);
        let dy = i32::from(row) - i32::from(y0);
        Some(((x0, y0), (dx, dy)))
    }
}
