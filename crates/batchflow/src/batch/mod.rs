//! Batch data model: tasks, the control state machine, timing and run guard.

pub mod guard;
pub mod progress;
pub mod state;
pub mod task;
pub mod timing;

pub use guard::RunGuard;
pub use progress::BatchProgress;
pub use state::{BatchSnapshot, BatchState, ControlState};
pub use task::{FileTask, TaskStatus};
pub use timing::{elapsed_ms, estimated_remaining_ms};

/// Generates a fresh batch job identifier.
pub fn new_job_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
