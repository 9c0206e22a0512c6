use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::game::{Action, Direction, GameState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    GameAction(Action),
    ToggleMute,
    Quit,
    None,
}

/// Maps terminal key events to logical actions
///
/// What a key means depends on where the game is: before the first start
/// Enter and Space both start, during play Space pauses, and while paused the
/// movement keys do nothing.
pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent, state: &GameState) -> KeyAction {
        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return KeyAction::Quit,
            KeyCode::Char('r') | KeyCode::Char('R') => {
                return KeyAction::GameAction(Action::Reset);
            }
            KeyCode::Char('m') | KeyCode::Char('M') => return KeyAction::ToggleMute,
            _ => {}
        }

        if !state.is_started {
            return match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => KeyAction::GameAction(Action::Start),
                _ => KeyAction::None,
            };
        }

        if state.is_over {
            return match key.code {
                KeyCode::Enter => KeyAction::GameAction(Action::Start),
                _ => KeyAction::None,
            };
        }

        if key.code == KeyCode::Char(' ') {
            return KeyAction::GameAction(Action::TogglePause);
        }

        if state.is_paused {
            return KeyAction::None;
        }

        match Self::direction_for(key.code) {
            Some(direction) => KeyAction::GameAction(Action::Move(direction)),
            None => KeyAction::None,
        }
    }

    fn direction_for(code: KeyCode) -> Option<Direction> {
        match code {
            // Arrow keys
            KeyCode::Up => Some(Direction::Up),
            KeyCode::Down => Some(Direction::Down),
            KeyCode::Left => Some(Direction::Left),
            KeyCode::Right => Some(Direction::Right),

            // WASD
            KeyCode::Char('w') | KeyCode::Char('W') => Some(Direction::Up),
            KeyCode::Char('s') | KeyCode::Char('S') => Some(Direction::Down),
            KeyCode::Char('a') | KeyCode::Char('A') => Some(Direction::Left),
            KeyCode::Char('d') | KeyCode::Char('D') => Some(Direction::Right),

            _ => None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
