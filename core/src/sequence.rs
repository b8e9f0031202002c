//! Timestamp randomization and sequencing
//!
//! Everything here is about making generated commit times look like a
//! human produced them: seconds get rerolled according to how coarsely a
//! time was specified, chronological ordering is enforced against the
//! previous value with jitter, and timestamps can be pulled into an
//! allowed hour-of-day window (which may wrap past midnight).

use chrono::{Local, TimeZone, Timelike};
use rand::Rng;

use crate::expr::Precision;

/// Minimum chronological gap between consecutive rewritten commits.
pub const MIN_GAP_SECS: i64 = 60;

/// Reroll the sub-precision part of an epoch.
///
/// Full precision is returned unchanged; minute (and second, the
/// default for coarse input) precision rerolls seconds within the same
/// minute; hour precision rerolls minutes and seconds within the same
/// hour.
pub fn randomize(epoch: i64, precision: Precision) -> i64 {
    let mut rng = rand::thread_rng();
    match precision {
        Precision::Full => epoch,
        Precision::Second | Precision::Minute => {
            epoch - epoch.rem_euclid(60) + rng.gen_range(0..60)
        }
        Precision::Hour => epoch - epoch.rem_euclid(3600) + rng.gen_range(0..3600),
    }
}

/// Guarantee `proposed` lands at least `min_gap` after `min_epoch`.
///
/// A proposal that already clears the bound is returned unchanged;
/// otherwise the result is `min_epoch + min_gap` plus uniform jitter
/// in `[0, min_gap]`.
pub fn ensure_after(proposed: i64, min_epoch: i64, min_gap: i64) -> i64 {
    if proposed >= min_epoch + min_gap {
        return proposed;
    }
    min_epoch + min_gap + rand::thread_rng().gen_range(0..=min_gap.max(0))
}

/// Whether a local hour falls inside a window that may wrap midnight.
pub fn in_hour_window(hour: u32, start: u32, end: u32) -> bool {
    if start == end {
        // degenerate window covers the whole day
        true
    } else if start < end {
        hour >= start && hour < end
    } else {
        hour >= start || hour < end
    }
}

/// Pull an epoch into an allowed local hour window.
///
/// Epochs already inside the window are unchanged, which makes the
/// operation idempotent. Anything outside moves to the window's start
/// on the nearer applicable day (at most 12h away) plus a uniform
/// offset inside the window's first hour.
pub fn clamp_to_hour_window(epoch: i64, start_hour: u32, end_hour: u32) -> i64 {
    let Some(dt) = Local.timestamp_opt(epoch, 0).single() else {
        return epoch;
    };
    if in_hour_window(dt.hour(), start_hour, end_hour) {
        return epoch;
    }

    let local_midnight = epoch - i64::from(dt.num_seconds_from_midnight());
    let window_start = local_midnight + i64::from(start_hour) * 3600;
    let nearest = [-1i64, 0, 1]
        .iter()
        .map(|day| window_start + day * 86_400)
        .min_by_key(|candidate| (candidate - epoch).abs())
        .unwrap_or(window_start);

    nearest + rand::thread_rng().gen_range(0..3600)
}
