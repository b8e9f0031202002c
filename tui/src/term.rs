//! Terminal plumbing: raw-mode guard, glyph sets, line repainting
//!
//! Components render as a block of lines repainted in place on every
//! keypress, dialoguer-style, on stderr. The raw-mode guard restores
//! the terminal (cooked mode, cursor visible) on every exit path,
//! including panics, via `Drop`.

use std::io::{self, Write};

use crossterm::{
    cursor, execute, queue,
    style::Print,
    terminal::{self, Clear, ClearType},
};

use crate::session::{Session, TabStatus};

/// Glyph set for pointers, checkboxes and the spinner.
///
/// Terminals that don't advertise UTF-8 (or report TERM=dumb) get plain
/// ASCII: `>`, `[ ]`/`[x]`, `( )`/`(*)`.
#[derive(Debug, Clone, Copy)]
pub struct Glyphs {
    pub pointer: &'static str,
    pub checked: &'static str,
    pub unchecked: &'static str,
    pub radio_on: &'static str,
    pub radio_off: &'static str,
    pub done: &'static str,
    pub current: &'static str,
    pub pending: &'static str,
    pub spinner_frames: &'static [&'static str],
}

const UNICODE_SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const ASCII_SPINNER: &[&str] = &["-", "\\", "|", "/"];

impl Glyphs {
    pub fn unicode() -> Self {
        Self {
            pointer: "❯",
            checked: "◉",
            unchecked: "◯",
            radio_on: "●",
            radio_off: "○",
            done: "✓",
            current: "▸",
            pending: "·",
            spinner_frames: UNICODE_SPINNER,
        }
    }

    pub fn ascii() -> Self {
        Self {
            pointer: ">",
            checked: "[x]",
            unchecked: "[ ]",
            radio_on: "(*)",
            radio_off: "( )",
            done: "*",
            current: ">",
            pending: ".",
            spinner_frames: ASCII_SPINNER,
        }
    }

    /// Pick a glyph set from the environment.
    pub fn detect() -> Self {
        let term = std::env::var("TERM").unwrap_or_default();
        if term == "dumb" {
            return Self::ascii();
        }
        let locale = std::env::var("LC_ALL")
            .or_else(|_| std::env::var("LC_CTYPE"))
            .or_else(|_| std::env::var("LANG"))
            .unwrap_or_default();
        if locale.to_uppercase().contains("UTF") {
            Self::unicode()
        } else {
            Self::ascii()
        }
    }
}

/// Raw-mode guard; restores cooked mode and cursor on drop.
pub struct RawModeGuard {
    active: bool,
}

impl RawModeGuard {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(io::stderr(), cursor::Hide)?;
        Ok(Self { active: true })
    }

    /// Restore the terminal early; harmless to call more than once.
    pub fn release(&mut self) {
        if self.active {
            self.active = false;
            let _ = terminal::disable_raw_mode();
            let _ = execute!(io::stderr(), cursor::Show);
        }
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// In-place repainting of a block of lines on stderr.
///
/// Tracks how many lines the previous frame drew and where the cursor
/// was parked so the next frame starts from the block's top.
pub struct Painter {
    lines_drawn: u16,
    cursor_up: u16,
}

impl Default for Painter {
    fn default() -> Self {
        Self::new()
    }
}

impl Painter {
    pub fn new() -> Self {
        Self {
            lines_drawn: 0,
            cursor_up: 0,
        }
    }

    fn return_to_block_end(&mut self, out: &mut impl Write) -> io::Result<()> {
        if self.cursor_up > 0 {
            queue!(out, cursor::MoveToNextLine(self.cursor_up))?;
            self.cursor_up = 0;
        }
        Ok(())
    }

    /// Redraw the whole block, replacing the previous frame.
    pub fn repaint(&mut self, lines: &[String]) -> io::Result<()> {
        let mut out = io::stderr();
        self.return_to_block_end(&mut out)?;
        if self.lines_drawn > 0 {
            queue!(out, cursor::MoveToPreviousLine(self.lines_drawn))?;
        }
        for line in lines {
            queue!(
                out,
                cursor::MoveToColumn(0),
                Clear(ClearType::CurrentLine),
                Print(line),
                Print("\r\n")
            )?;
        }
        if (lines.len() as u16) < self.lines_drawn {
            queue!(out, Clear(ClearType::FromCursorDown))?;
        }
        out.flush()?;
        self.lines_drawn = lines.len() as u16;
        Ok(())
    }

    /// Park the visible cursor `rows_up` lines above the block end at
    /// `col`, for text-entry components.
    pub fn place_cursor(&mut self, rows_up: u16, col: u16) -> io::Result<()> {
        let mut out = io::stderr();
        if rows_up > 0 {
            queue!(out, cursor::MoveUp(rows_up))?;
        }
        queue!(out, cursor::MoveToColumn(col), cursor::Show)?;
        out.flush()?;
        self.cursor_up = rows_up;
        Ok(())
    }

    /// Erase the block entirely (used on cancellation).
    pub fn clear(&mut self) -> io::Result<()> {
        let mut out = io::stderr();
        self.return_to_block_end(&mut out)?;
        if self.lines_drawn > 0 {
            queue!(
                out,
                cursor::MoveToPreviousLine(self.lines_drawn),
                Clear(ClearType::FromCursorDown)
            )?;
            self.lines_drawn = 0;
        }
        out.flush()
    }

    /// Replace the block with a single summary line.
    pub fn finish(&mut self, line: &str) -> io::Result<()> {
        self.clear()?;
        let mut out = io::stderr();
        execute!(out, cursor::MoveToColumn(0), Print(line), Print("\r\n"))
    }
}

/// Render the session's tab bar as one line.
pub fn tab_bar_line(session: &Session, glyphs: &Glyphs) -> Option<String> {
    if session.tabs().is_empty() {
        return None;
    }
    let rendered: Vec<String> = session
        .tabs()
        .iter()
        .map(|tab| {
            let mark = match tab.status {
                TabStatus::Completed => glyphs.done,
                TabStatus::Current => glyphs.current,
                TabStatus::Pending => glyphs.pending,
            };
            format!("{} {}", mark, tab.name)
        })
        .collect();
    Some(rendered.join("  |  "))
}
