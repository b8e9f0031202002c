//! Yes/no confirmation component

use std::io;

use crate::key::{read_key, Key};
use crate::session::Session;
use crate::term::{tab_bar_line, Glyphs, Painter, RawModeGuard};

/// Ask a yes/no question; enter takes the default, escape cancels.
pub fn confirm(session: &mut Session, question: &str, default: bool) -> io::Result<Option<bool>> {
    let glyphs = Glyphs::detect();
    let mut guard = RawModeGuard::new()?;
    let mut painter = Painter::new();
    let hint = if default { "(Y/n)" } else { "(y/N)" };

    let mut lines = Vec::with_capacity(2);
    if let Some(bar) = tab_bar_line(session, &glyphs) {
        lines.push(bar);
    }
    lines.push(format!("? {} {}", question, hint));
    painter.repaint(&lines)?;

    loop {
        let answer = match read_key()? {
            Key::Char('y') | Key::Char('Y') => Some(true),
            Key::Char('n') | Key::Char('N') => Some(false),
            Key::Enter => Some(default),
            Key::Esc | Key::Char('q') => None,
            _ => continue,
        };

        match answer {
            Some(yes) => {
                painter.finish(&format!(
                    "{} {} {}",
                    glyphs.done,
                    question,
                    if yes { "yes" } else { "no" }
                ))?;
                guard.release();
                return Ok(Some(yes));
            }
            None => {
                painter.clear()?;
                guard.release();
                session.cancel();
                return Ok(None);
            }
        }
    }
}
