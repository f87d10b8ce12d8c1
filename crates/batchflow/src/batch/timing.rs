//! Elapsed time and ETA derived from a batch snapshot.

use chrono::{DateTime, Utc};

use crate::batch::state::{BatchSnapshot, ControlState};

/// Running time of the batch in milliseconds, excluding every paused interval.
///
/// While paused the reference point is the pause instant, so the value freezes
/// until the batch resumes.
pub fn elapsed_ms(snapshot: &BatchSnapshot, now: DateTime<Utc>) -> i64 {
    let Some(started_at) = snapshot.started_at else {
        return 0;
    };

    let reference = match (snapshot.control_state, snapshot.paused_at) {
        (ControlState::Paused, Some(paused_at)) => paused_at,
        _ => now,
    };

    let elapsed = (reference - started_at).num_milliseconds() - snapshot.total_paused_duration_ms;
    elapsed.max(0)
}

/// Estimated milliseconds left, extrapolated from the average time spent per
/// settled task. Failed and skipped tasks count as settled.
///
/// `None` before the batch starts or before any task settles.
pub fn estimated_remaining_ms(snapshot: &BatchSnapshot, now: DateTime<Utc>) -> Option<i64> {
    if snapshot.control_state == ControlState::Idle || snapshot.current_index < 0 {
        return None;
    }

    let settled = snapshot.terminal_count();
    if settled == 0 {
        return None;
    }

    let remaining = snapshot.tasks.len().saturating_sub(settled);
    let avg_per_task = elapsed_ms(snapshot, now) as f64 / settled as f64;
    Some((avg_per_task * remaining as f64).round() as i64)
}
