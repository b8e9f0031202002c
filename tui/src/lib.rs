//! Tempo TUI - modal terminal interview components
//!
//! This crate provides:
//! - Session state (tabs, answers, cancellation) passed explicitly
//! - Blocking components: single/multi select, text input, timestamp
//!   input with live preview, confirm, indefinite spinner
//! - Key decoding to a closed enum and in-place line repainting
//! - Optional delegation of select components to fzf
//!
//! No domain knowledge lives here; every component blocks until the
//! user confirms (`Ok(Some(_))`) or cancels (`Ok(None)`), and restores
//! the terminal on every exit path.

pub mod confirm;
pub mod key;
pub mod picker;
pub mod select;
pub mod session;
pub mod spinner;
pub mod term;
pub mod text;
pub mod timestamp;

pub use confirm::confirm;
pub use key::{map_key, read_key, Key};
pub use select::{multi_select, single_select};
pub use session::{Answer, Session, Tab, TabStatus};
pub use spinner::Spinner;
pub use term::{Glyphs, Painter, RawModeGuard};
pub use text::{text_input, Validator};
pub use timestamp::timestamp_input;
