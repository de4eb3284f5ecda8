use crate::config::GestureTuning;

use super::types::TouchEvent;

/// Tap iff the gesture lasted strictly between the tap bounds and the
/// accumulated rotation drifted less than the tolerance. Missing rotation on
/// either side is never a tap.
pub fn is_tap(baseline: &TouchEvent, current: &TouchEvent, tuning: &GestureTuning) -> bool {
    let time_range = current.timestamp.saturating_sub(baseline.timestamp);
    let time_ok = tuning.tap_min_ms < time_range && time_range < tuning.tap_max_ms;

    let rotation_ok = match (baseline.rotation_sum(), current.rotation_sum()) {
        (Some(start), Some(end)) => (start - end).abs() < tuning.tap_rotation_tolerance,
        _ => false,
    };

    time_ok && rotation_ok
}
