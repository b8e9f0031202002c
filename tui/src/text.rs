//! Free-text input component

use std::io;

use crate::key::{read_key, Key};
use crate::session::{Answer, Session};
use crate::term::{tab_bar_line, Glyphs, Painter, RawModeGuard};

/// Validator run on confirm; an `Err` message re-prompts in place.
pub type Validator<'a> = &'a dyn Fn(&str) -> Result<(), String>;

pub(crate) struct Buffer {
    chars: Vec<char>,
    cursor: usize,
}

impl Buffer {
    pub(crate) fn new(initial: &str) -> Self {
        let chars: Vec<char> = initial.chars().collect();
        let cursor = chars.len();
        Self { chars, cursor }
    }

    pub(crate) fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    /// Apply an editing key; returns false for keys the buffer ignores.
    pub(crate) fn apply(&mut self, key: Key) -> bool {
        match key {
            Key::Char(c) => {
                self.chars.insert(self.cursor, c);
                self.cursor += 1;
            }
            Key::Space => {
                self.chars.insert(self.cursor, ' ');
                self.cursor += 1;
            }
            Key::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.chars.remove(self.cursor);
                }
            }
            Key::Left => self.cursor = self.cursor.saturating_sub(1),
            Key::Right => self.cursor = (self.cursor + 1).min(self.chars.len()),
            Key::Home => self.cursor = 0,
            Key::End => self.cursor = self.chars.len(),
            _ => return false,
        }
        true
    }
}

/// Read one line of text; `None` means the user cancelled.
///
/// The default is pre-filled and editable. A failing validator shows
/// its message below the input and keeps the buffer intact.
pub fn text_input(
    session: &mut Session,
    key: &str,
    prompt: &str,
    default: &str,
    validator: Option<Validator>,
) -> io::Result<Option<String>> {
    let glyphs = Glyphs::detect();
    let mut guard = RawModeGuard::new()?;
    let mut painter = Painter::new();
    let mut buffer = Buffer::new(default);
    let mut error: Option<String> = None;

    loop {
        let prefix = format!("? {}: ", prompt);
        let mut lines = Vec::with_capacity(3);
        if let Some(bar) = tab_bar_line(session, &glyphs) {
            lines.push(bar);
        }
        let input_row = lines.len();
        lines.push(format!("{}{}", prefix, buffer.text()));
        if let Some(msg) = &error {
            lines.push(format!("  ! {}", msg));
        }
        painter.repaint(&lines)?;

        let rows_up = (lines.len() - input_row) as u16;
        let col = (prefix.chars().count() + buffer.cursor()) as u16;
        painter.place_cursor(rows_up, col)?;

        match read_key()? {
            Key::Enter => {
                let text = buffer.text();
                if let Some(validate) = validator {
                    if let Err(msg) = validate(&text) {
                        error = Some(msg);
                        continue;
                    }
                }
                painter.finish(&format!("{} {}: {}", glyphs.done, prompt, text))?;
                guard.release();
                session.record(key, Answer::Text(text.clone()));
                return Ok(Some(text));
            }
            Key::Esc => {
                painter.clear()?;
                guard.release();
                session.cancel();
                return Ok(None);
            }
            other => {
                if buffer.apply(other) {
                    error = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_insert_and_delete() {
        let mut buf = Buffer::new("");
        buf.apply(Key::Char('h'));
        buf.apply(Key::Char('i'));
        assert_eq!(buf.text(), "hi");
        buf.apply(Key::Backspace);
        assert_eq!(buf.text(), "h");
        assert_eq!(buf.cursor(), 1);
    }

    #[test]
    fn test_buffer_cursor_movement_and_mid_insert() {
        let mut buf = Buffer::new("ac");
        buf.apply(Key::Left);
        buf.apply(Key::Char('b'));
        assert_eq!(buf.text(), "abc");
        buf.apply(Key::Home);
        assert_eq!(buf.cursor(), 0);
        buf.apply(Key::End);
        assert_eq!(buf.cursor(), 3);
    }

    #[test]
    fn test_buffer_prefilled_default() {
        let mut buf = Buffer::new("fix bug");
        assert_eq!(buf.cursor(), 7);
        buf.apply(Key::Space);
        buf.apply(Key::Char('x'));
        assert_eq!(buf.text(), "fix bug x");
    }

    #[test]
    fn test_buffer_backspace_at_start_is_noop() {
        let mut buf = Buffer::new("a");
        buf.apply(Key::Home);
        buf.apply(Key::Backspace);
        assert_eq!(buf.text(), "a");
    }

    #[test]
    fn test_buffer_ignores_navigation_keys() {
        let mut buf = Buffer::new("a");
        assert!(!buf.apply(Key::Enter));
        assert!(!buf.apply(Key::Tab));
        assert_eq!(buf.text(), "a");
    }
}
