//! Timestamp input with live preview
//!
//! A text input whose preview line is recomputed on every keystroke:
//! empty shows the base time "(now)", relative text is parsed against
//! the base and annotated with a relative phrase, anything else is
//! tried as an absolute expression. Invalid text shows "Invalid format"
//! and blocks confirm. On confirm the value is randomized according to
//! the precision the user actually typed.

use std::io;

use tempo_core::{
    describe_offset, detect_precision, format_epoch, is_relative, parse, randomize,
};

use crate::key::{read_key, Key};
use crate::session::{Answer, Session};
use crate::term::{tab_bar_line, Glyphs, Painter, RawModeGuard};
use crate::text::Buffer;

pub(crate) fn preview_line(text: &str, base: i64) -> (String, Option<i64>) {
    let trimmed = text.trim();
    match parse(trimmed, base) {
        Ok(epoch) => {
            let line = if trimmed.is_empty() {
                format!("{} (now)", format_epoch(epoch))
            } else if is_relative(trimmed) {
                format!("{} ({})", format_epoch(epoch), describe_offset(epoch - base))
            } else {
                format_epoch(epoch)
            };
            (line, Some(epoch))
        }
        Err(_) => ("Invalid format".to_string(), None),
    }
}

/// Read a timestamp expression against `base`; `None` means cancelled.
pub fn timestamp_input(
    session: &mut Session,
    key: &str,
    prompt: &str,
    base: i64,
) -> io::Result<Option<i64>> {
    let glyphs = Glyphs::detect();
    let mut guard = RawModeGuard::new()?;
    let mut painter = Painter::new();
    let mut buffer = Buffer::new("");

    loop {
        let text = buffer.text();
        let (preview, value) = preview_line(&text, base);

        let prefix = format!("? {}: ", prompt);
        let mut lines = Vec::with_capacity(3);
        if let Some(bar) = tab_bar_line(session, &glyphs) {
            lines.push(bar);
        }
        let input_row = lines.len();
        lines.push(format!("{}{}", prefix, text));
        lines.push(format!("  {} {}", if value.is_some() { " " } else { "!" }, preview));
        painter.repaint(&lines)?;

        let rows_up = (lines.len() - input_row) as u16;
        let col = (prefix.chars().count() + buffer.cursor()) as u16;
        painter.place_cursor(rows_up, col)?;

        match read_key()? {
            Key::Enter => {
                // invalid text keeps the component open
                let Some(epoch) = value else { continue };
                let final_time = randomize(epoch, detect_precision(&text));
                painter.finish(&format!(
                    "{} {}: {}",
                    glyphs.done,
                    prompt,
                    format_epoch(final_time)
                ))?;
                guard.release();
                session.record(key, Answer::Time(final_time));
                return Ok(Some(final_time));
            }
            Key::Esc => {
                painter.clear()?;
                guard.release();
                session.cancel();
                return Ok(None);
            }
            other => {
                buffer.apply(other);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_previews_base_as_now() {
        let (line, value) = preview_line("", 1_700_000_000);
        assert!(line.ends_with("(now)"), "line: {}", line);
        assert_eq!(value, Some(1_700_000_000));
    }

    #[test]
    fn test_relative_preview_carries_phrase() {
        let (line, value) = preview_line("+15m", 1_700_000_000);
        assert_eq!(value, Some(1_700_000_900));
        assert!(line.contains("in 15m"), "line: {}", line);

        let (line, value) = preview_line("-2h", 1_700_000_000);
        assert_eq!(value, Some(1_700_000_000 - 7200));
        assert!(line.contains("2h ago"), "line: {}", line);
    }

    #[test]
    fn test_invalid_preview_blocks_value() {
        let (line, value) = preview_line("gibberish", 1_700_000_000);
        assert_eq!(line, "Invalid format");
        assert_eq!(value, None);
    }

    #[test]
    fn test_absolute_preview_has_no_phrase() {
        let (line, value) = preview_line("2024-03-05 10:30", 0);
        assert!(value.is_some());
        assert!(!line.contains('('), "line: {}", line);
    }
}
