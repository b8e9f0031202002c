//! Key decoding
//!
//! Raw terminal input arrives as crossterm events; components only see
//! the closed [`Key`] enum below. Escape-sequence disambiguation (arrow
//! keys, home/end, shift-tab) is handled by the event reader; anything
//! unrecognized is dropped rather than leaked to components.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Closed set of keys the components react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Tab,
    ShiftTab,
    Home,
    End,
    PageUp,
    PageDown,
    Enter,
    Esc,
    Backspace,
    Space,
    Char(char),
}

/// Map a crossterm key event onto [`Key`].
///
/// Ctrl-C is treated as cancellation, same as escape.
pub fn map_key(key: &KeyEvent) -> Option<Key> {
    match key.code {
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Tab => Some(Key::Tab),
        KeyCode::BackTab => Some(Key::ShiftTab),
        KeyCode::Home => Some(Key::Home),
        KeyCode::End => Some(Key::End),
        KeyCode::PageUp => Some(Key::PageUp),
        KeyCode::PageDown => Some(Key::PageDown),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc => Some(Key::Esc),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Char(' ') => Some(Key::Space),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Key::Esc),
        KeyCode::Char(c) => Some(Key::Char(c)),
        _ => None,
    }
}

/// Block until the next recognized keypress.
pub fn read_key() -> io::Result<Key> {
    loop {
        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(mapped) = map_key(&key) {
                return Ok(mapped);
            }
        }
    }
}
