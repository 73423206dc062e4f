use crate::config::PROGRESS_HOLDBACK;

/// Loading-indicator percentage for `loaded` of `total` bytes
///
/// While the camera-state lookup is still pending the value is held back by
/// a fixed offset so the bar does not reach 100% before the view can start.
pub fn progress_percent(loaded: u64, total: u64, state_pending: bool) -> f32 {
    if total == 0 {
        return 0.0;
    }
    let percent = loaded as f32 / total as f32 * 100.0;
    if state_pending {
        (percent - PROGRESS_HOLDBACK).max(0.0)
    } else {
        percent
    }
}
