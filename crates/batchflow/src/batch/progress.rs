//! Render-ready progress summary of a batch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::batch::state::{BatchSnapshot, ControlState};
use crate::batch::timing::{elapsed_ms, estimated_remaining_ms};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProgress {
    pub job_id: String,
    pub control_state: ControlState,
    pub current_index: i64,
    pub total_count: usize,
    pub completed_count: usize,
    pub failed_count: usize,
    pub skipped_count: usize,
    pub elapsed_ms: i64,
    /// `None` while there is nothing to extrapolate from.
    pub estimated_remaining_ms: Option<i64>,
    pub progress_percent: f64,
}

impl BatchProgress {
    pub fn from_snapshot(snapshot: &BatchSnapshot, now: DateTime<Utc>) -> Self {
        Self {
            job_id: snapshot.job_id.clone(),
            control_state: snapshot.control_state,
            current_index: snapshot.current_index,
            total_count: snapshot.tasks.len(),
            completed_count: snapshot.completed_count(),
            failed_count: snapshot.failed_count(),
            skipped_count: snapshot.skipped_count(),
            elapsed_ms: elapsed_ms(snapshot, now),
            estimated_remaining_ms: estimated_remaining_ms(snapshot, now),
            progress_percent: snapshot.progress_percent(),
        }
    }
}
