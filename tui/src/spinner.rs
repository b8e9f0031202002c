//! Indefinite spinner
//!
//! One background thread ticks the animation while the main flow blocks
//! on a longer operation. `stop` sets the flag and joins the thread
//! before returning, so no spinner write can interleave with later
//! terminal output. Stopping twice is safe.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};

use crate::term::Glyphs;

const TICK: Duration = Duration::from_millis(80);

pub struct Spinner {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Spinner {
    /// Start ticking `message` on stderr until stopped.
    pub fn start(message: &str) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let text = message.to_string();
        let frames = Glyphs::detect().spinner_frames;

        let handle = thread::spawn(move || {
            let mut out = io::stderr();
            let mut tick = 0usize;
            while !flag.load(Ordering::Relaxed) {
                let frame = frames[tick % frames.len()];
                let _ = write!(out, "\r{} {}", frame, text);
                let _ = out.flush();
                tick += 1;
                thread::sleep(TICK);
            }
            let _ = execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine));
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Stop the animation and wait for the thread to clear its line.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_is_idempotent() {
        let mut spinner = Spinner::start("working");
        spinner.stop();
        spinner.stop();
    }

    #[test]
    fn test_drop_after_stop_is_safe() {
        let mut spinner = Spinner::start("working");
        spinner.stop();
        drop(spinner);
    }
}
