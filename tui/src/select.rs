//! Single- and multi-select components
//!
//! Both block until confirm or cancel. When an fzf binary is available
//! and the session sits on a real terminal the selection is delegated
//! to it; the built-in renderer is the fallback and the contract is
//! identical either way.

use std::io;

use tracing::debug;

use crate::key::{read_key, Key};
use crate::picker;
use crate::session::{Answer, Session};
use crate::term::{tab_bar_line, Glyphs, Painter, RawModeGuard};

fn option_line(
    glyphs: &Glyphs,
    at_cursor: bool,
    mark: &str,
    option: &str,
    description: Option<&str>,
) -> String {
    let pointer = if at_cursor { glyphs.pointer } else { " " };
    match description.filter(|d| !d.is_empty()) {
        Some(desc) => format!("{} {} {}  ({})", pointer, mark, option, desc),
        None => format!("{} {} {}", pointer, mark, option),
    }
}

fn move_cursor(cursor: usize, len: usize, key: Key) -> usize {
    match key {
        Key::Up | Key::Char('k') => {
            if cursor == 0 {
                len - 1
            } else {
                cursor - 1
            }
        }
        Key::Down | Key::Char('j') | Key::Tab => (cursor + 1) % len,
        Key::Home | Key::PageUp => 0,
        Key::End | Key::PageDown => len - 1,
        _ => cursor,
    }
}

/// Pick exactly one option; `None` means the user cancelled.
pub fn single_select(
    session: &mut Session,
    key: &str,
    prompt: &str,
    options: &[String],
    descriptions: &[String],
    initial: usize,
) -> io::Result<Option<usize>> {
    if options.is_empty() {
        return Ok(None);
    }

    if picker::available() {
        match picker::pick(prompt, options, descriptions, false) {
            Ok(Some(picked)) if !picked.is_empty() => {
                session.record(key, Answer::Selection(vec![picked[0]]));
                return Ok(Some(picked[0]));
            }
            Ok(_) => {
                session.cancel();
                return Ok(None);
            }
            Err(e) => debug!("fzf delegate failed, using built-in renderer: {}", e),
        }
    }

    let glyphs = Glyphs::detect();
    let mut guard = RawModeGuard::new()?;
    let mut painter = Painter::new();
    let mut cursor = initial.min(options.len() - 1);

    loop {
        let mut lines = Vec::with_capacity(options.len() + 2);
        if let Some(bar) = tab_bar_line(session, &glyphs) {
            lines.push(bar);
        }
        lines.push(format!("? {}", prompt));
        for (i, option) in options.iter().enumerate() {
            let mark = if i == cursor {
                glyphs.radio_on
            } else {
                glyphs.radio_off
            };
            lines.push(option_line(
                &glyphs,
                i == cursor,
                mark,
                option,
                descriptions.get(i).map(String::as_str),
            ));
        }
        painter.repaint(&lines)?;

        match read_key()? {
            Key::Enter => {
                painter.finish(&format!("{} {}: {}", glyphs.done, prompt, options[cursor]))?;
                guard.release();
                session.record(key, Answer::Selection(vec![cursor]));
                return Ok(Some(cursor));
            }
            Key::Esc | Key::Char('q') => {
                painter.clear()?;
                guard.release();
                session.cancel();
                return Ok(None);
            }
            other => cursor = move_cursor(cursor, options.len(), other),
        }
    }
}

/// Toggle any subset of options; `None` means the user cancelled.
pub fn multi_select(
    session: &mut Session,
    key: &str,
    prompt: &str,
    options: &[String],
    descriptions: &[String],
    defaults: &[usize],
) -> io::Result<Option<Vec<usize>>> {
    if options.is_empty() {
        return Ok(Some(Vec::new()));
    }

    if picker::available() {
        match picker::pick(prompt, options, descriptions, true) {
            Ok(Some(picked)) => {
                session.record(key, Answer::Selection(picked.clone()));
                return Ok(Some(picked));
            }
            Ok(None) => {
                session.cancel();
                return Ok(None);
            }
            Err(e) => debug!("fzf delegate failed, using built-in renderer: {}", e),
        }
    }

    let glyphs = Glyphs::detect();
    let mut guard = RawModeGuard::new()?;
    let mut painter = Painter::new();
    let mut cursor = 0usize;
    let mut picked = vec![false; options.len()];
    for &i in defaults {
        if let Some(slot) = picked.get_mut(i) {
            *slot = true;
        }
    }

    loop {
        let mut lines = Vec::with_capacity(options.len() + 2);
        if let Some(bar) = tab_bar_line(session, &glyphs) {
            lines.push(bar);
        }
        lines.push(format!("? {} (space toggles, enter confirms)", prompt));
        for (i, option) in options.iter().enumerate() {
            let mark = if picked[i] {
                glyphs.checked
            } else {
                glyphs.unchecked
            };
            lines.push(option_line(
                &glyphs,
                i == cursor,
                mark,
                option,
                descriptions.get(i).map(String::as_str),
            ));
        }
        painter.repaint(&lines)?;

        match read_key()? {
            Key::Space => picked[cursor] = !picked[cursor],
            Key::Enter => {
                let chosen: Vec<usize> = picked
                    .iter()
                    .enumerate()
                    .filter_map(|(i, &on)| on.then_some(i))
                    .collect();
                let summary: Vec<&str> = chosen.iter().map(|&i| options[i].as_str()).collect();
                painter.finish(&format!(
                    "{} {}: {}",
                    glyphs.done,
                    prompt,
                    if summary.is_empty() {
                        "none".to_string()
                    } else {
                        summary.join(", ")
                    }
                ))?;
                guard.release();
                session.record(key, Answer::Selection(chosen.clone()));
                return Ok(Some(chosen));
            }
            Key::Esc | Key::Char('q') => {
                painter.clear()?;
                guard.release();
                session.cancel();
                return Ok(None);
            }
            other => cursor = move_cursor(cursor, options.len(), other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_wraps_both_ways() {
        assert_eq!(move_cursor(0, 3, Key::Up), 2);
        assert_eq!(move_cursor(2, 3, Key::Down), 0);
        assert_eq!(move_cursor(1, 3, Key::Char('k')), 0);
        assert_eq!(move_cursor(1, 3, Key::Char('j')), 2);
    }

    #[test]
    fn test_home_end_jump() {
        assert_eq!(move_cursor(1, 5, Key::Home), 0);
        assert_eq!(move_cursor(1, 5, Key::End), 4);
    }

    #[test]
    fn test_unrelated_keys_leave_cursor() {
        assert_eq!(move_cursor(1, 3, Key::Char('z')), 1);
    }

    #[test]
    fn test_option_line_layout() {
        let glyphs = Glyphs::ascii();
        let line = option_line(&glyphs, true, glyphs.radio_on, "push as-is", None);
        assert_eq!(line, "> (*) push as-is");
        let line = option_line(&glyphs, false, glyphs.unchecked, "author", Some("override"));
        assert_eq!(line, "  [ ] author  (override)");
    }
}
