//! Cadence presets
//!
//! A preset names a random inter-commit gap range and an optional
//! allowed hour-of-day window. Seven ship built in; users can add or
//! override presets in `~/.config/tempo/presets.toml`:
//!
//! ```toml
//! [presets.night-shift]
//! gap_min = 600
//! gap_max = 3600
//! hours = [23, 7]
//! description = "Overnight cadence"
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use rand::Rng;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::expr::Precision;
use crate::sequence::{clamp_to_hour_window, randomize};

/// Preset used when an unknown name is requested.
pub const DEFAULT_PRESET: &str = "natural";

/// Named cadence: random gap range plus optional hour window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CadencePreset {
    pub name: String,
    pub description: String,
    /// Minimum gap to the previous commit, seconds
    pub gap_min: i64,
    /// Maximum gap to the previous commit, seconds
    pub gap_max: i64,
    /// Allowed local hours as (start, end); may wrap past midnight
    pub hour_window: Option<(u32, u32)>,
}

impl CadencePreset {
    fn new(
        name: &str,
        description: &str,
        gap_min: i64,
        gap_max: i64,
        hour_window: Option<(u32, u32)>,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            gap_min,
            gap_max,
            hour_window,
        }
    }
}

/// The seven built-in presets.
pub fn builtin_presets() -> Vec<CadencePreset> {
    vec![
        CadencePreset::new("natural", "30m-3h apart, any hour", 1800, 10_800, None),
        CadencePreset::new("work-hours", "30m-2h apart, 9-17 local", 1800, 7200, Some((9, 17))),
        CadencePreset::new("late-night", "15m-2h apart, 22-04 local", 900, 7200, Some((22, 4))),
        CadencePreset::new("early-bird", "15m-90m apart, 05-09 local", 900, 5400, Some((5, 9))),
        CadencePreset::new(
            "weekend-warrior",
            "1h-4h apart, 10-23 local",
            3600,
            14_400,
            Some((10, 23)),
        ),
        CadencePreset::new("steady", "roughly hourly", 3300, 3900, None),
        CadencePreset::new("burst", "2m-15m apart, rapid-fire", 120, 900, None),
    ]
}

#[derive(Debug, Deserialize)]
struct PresetFile {
    #[serde(default)]
    presets: HashMap<String, PresetEntry>,
}

#[derive(Debug, Deserialize)]
struct PresetEntry {
    gap_min: i64,
    gap_max: i64,
    #[serde(default)]
    hours: Option<(u32, u32)>,
    #[serde(default)]
    description: Option<String>,
}

/// Location of the optional user preset file.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tempo").join("presets.toml"))
}

fn parse_preset_file(contents: &str) -> Option<Vec<CadencePreset>> {
    let file: PresetFile = match toml::from_str(contents) {
        Ok(file) => file,
        Err(e) => {
            warn!("Ignoring malformed preset file: {}", e);
            return None;
        }
    };

    let mut presets: Vec<CadencePreset> = file
        .presets
        .into_iter()
        .map(|(name, entry)| CadencePreset {
            description: entry.description.unwrap_or_default(),
            gap_min: entry.gap_min.min(entry.gap_max),
            gap_max: entry.gap_max.max(entry.gap_min),
            hour_window: entry.hours,
            name,
        })
        .collect();
    presets.sort_by(|a, b| a.name.cmp(&b.name));
    Some(presets)
}

/// Presets defined by the user, empty when no valid config exists.
pub fn user_presets() -> Vec<CadencePreset> {
    let Some(path) = config_path() else {
        return Vec::new();
    };
    match std::fs::read_to_string(&path) {
        Ok(contents) => parse_preset_file(&contents).unwrap_or_default(),
        Err(_) => {
            debug!("No user preset file at {}", path.display());
            Vec::new()
        }
    }
}

/// User presets first (overriding by name), then the built-ins.
pub fn all_presets() -> Vec<CadencePreset> {
    let mut presets = user_presets();
    for builtin in builtin_presets() {
        if !presets.iter().any(|p| p.name == builtin.name) {
            presets.push(builtin);
        }
    }
    presets
}

/// Look up a preset by name.
///
/// Unknown names degrade to the default preset with a warning; preset
/// selection is never a hard failure.
pub fn resolve(name: &str) -> CadencePreset {
    let presets = all_presets();
    if let Some(preset) = presets.iter().find(|p| p.name == name) {
        return preset.clone();
    }
    warn!("Unknown preset {:?}, falling back to {:?}", name, DEFAULT_PRESET);
    presets
        .into_iter()
        .find(|p| p.name == DEFAULT_PRESET)
        .unwrap_or_else(|| CadencePreset::new(DEFAULT_PRESET, "", 1800, 10_800, None))
}

/// Advance `base` by one preset step.
///
/// Draws a uniform gap in `[gap_min, gap_max]`, clamps into the hour
/// window when one is defined, then rerolls seconds.
pub fn apply_preset(preset: &CadencePreset, base: i64) -> i64 {
    let gap = if preset.gap_max > preset.gap_min {
        rand::thread_rng().gen_range(preset.gap_min..=preset.gap_max)
    } else {
        preset.gap_min
    };

    let mut next = base + gap;
    if let Some((start, end)) = preset.hour_window {
        next = clamp_to_hour_window(next, start, end);
    }
    randomize(next, Precision::Second)
}

/// [`apply_preset`] by name, with the warn-and-default fallback.
pub fn apply_named(name: &str, base: i64) -> i64 {
    apply_preset(&resolve(name), base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::in_hour_window;
    use chrono::{Local, TimeZone, Timelike};

    #[test]
    fn test_builtins_are_seven_and_sane() {
        let presets = builtin_presets();
        assert_eq!(presets.len(), 7);
        for p in &presets {
            assert!(p.gap_min > 0 && p.gap_min <= p.gap_max, "{} gaps", p.name);
            if let Some((start, end)) = p.hour_window {
                assert!(start < 24 && end < 24, "{} window", p.name);
            }
        }
    }

    #[test]
    fn test_resolve_unknown_falls_back_to_default() {
        let preset = resolve("no-such-cadence");
        assert_eq!(preset.name, DEFAULT_PRESET);
    }

    #[test]
    fn test_apply_preset_respects_gap_range() {
        let preset = CadencePreset::new("test", "", 100, 200, None);
        for _ in 0..50 {
            let next = apply_preset(&preset, 1_700_000_000);
            // gap plus up to 59s of second reroll in either direction
            assert!(next >= 1_700_000_000 + 100 - 59);
            assert!(next <= 1_700_000_000 + 200 + 59);
        }
    }

    #[test]
    fn test_work_hours_anchor_outside_window_lands_inside() {
        // 20:00 local is outside 9-17
        let anchor = Local
            .with_ymd_and_hms(2024, 6, 14, 20, 0, 0)
            .single()
            .expect("unambiguous local time")
            .timestamp();
        let preset = builtin_presets()
            .into_iter()
            .find(|p| p.name == "work-hours")
            .expect("builtin exists");
        for _ in 0..20 {
            let next = apply_preset(&preset, anchor);
            let hour = Local
                .timestamp_opt(next, 0)
                .single()
                .expect("valid epoch")
                .hour();
            assert!(in_hour_window(hour, 9, 17), "hour {} outside 9-17", hour);
        }
    }

    #[test]
    fn test_parse_preset_file() {
        let parsed = parse_preset_file(
            r#"
            [presets.night-shift]
            gap_min = 600
            gap_max = 3600
            hours = [23, 7]
            description = "Overnight cadence"
            "#,
        )
        .expect("valid file");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "night-shift");
        assert_eq!(parsed[0].hour_window, Some((23, 7)));
    }

    #[test]
    fn test_parse_preset_file_rejects_garbage() {
        assert!(parse_preset_file("not [valid toml").is_none());
    }
}
