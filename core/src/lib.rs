//! Tempo Core - Time expression engine and rewrite planning
//!
//! This crate provides:
//! - Relative/absolute/keyword time expression parsing
//! - Precision detection and timestamp randomization
//! - Chronological sequencing with minimum gaps and hour windows
//! - Cadence presets (built-in and user-defined)
//! - Commit records and rewrite plans
//!
//! No terminal or version-control knowledge lives here; everything is
//! pure computation over epoch seconds.

pub mod error;
pub mod expr;
pub mod plan;
pub mod preset;
pub mod sequence;

pub use error::Error;
pub use expr::{
    describe_offset, detect_precision, format_epoch, is_relative, parse, parse_absolute,
    parse_relative, Precision,
};
pub use plan::{CommitRecord, PlanEntry, RewritePlan};
pub use preset::{
    all_presets, apply_named, apply_preset, builtin_presets, resolve, CadencePreset,
    DEFAULT_PRESET,
};
pub use sequence::{clamp_to_hour_window, ensure_after, in_hour_window, randomize, MIN_GAP_SECS};
