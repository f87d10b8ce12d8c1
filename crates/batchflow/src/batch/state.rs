//! Batch control state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::batch::task::{FileTask, TaskStatus};

/// Top-level control state of a batch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ControlState {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
    Stopped,
}

impl std::fmt::Display for ControlState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlState::Idle => write!(f, "Idle"),
            ControlState::Running => write!(f, "Running"),
            ControlState::Paused => write!(f, "Paused"),
            ControlState::Completed => write!(f, "Completed"),
            ControlState::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Ordered task list plus control and timing anchors for one batch.
///
/// Every transition is a plain method taking the current time where it needs
/// one; the type does no I/O and knows nothing about the execution engine.
/// Transitions that do not apply in the current state are silent no-ops and
/// report `false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchState {
    pub control_state: ControlState,
    pub tasks: Vec<FileTask>,
    /// `-1` before the batch starts.
    pub current_index: i64,
    pub folder_path: String,
    pub job_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused_at: Option<DateTime<Utc>>,
    pub total_paused_duration_ms: i64,
}

/// Read-only copy of a [`BatchState`] handed to consumers.
pub type BatchSnapshot = BatchState;

impl Default for BatchState {
    fn default() -> Self {
        Self {
            control_state: ControlState::Idle,
            tasks: Vec::new(),
            current_index: -1,
            folder_path: String::new(),
            job_id: String::new(),
            started_at: None,
            paused_at: None,
            total_paused_duration_ms: 0,
        }
    }
}

impl BatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the batch with a fresh, idle one over `tasks`.
    pub fn initialize(
        &mut self,
        folder_path: impl Into<String>,
        tasks: Vec<FileTask>,
        job_id: impl Into<String>,
    ) {
        *self = Self {
            tasks,
            folder_path: folder_path.into(),
            job_id: job_id.into(),
            ..Self::default()
        };
    }

    /// Idle -> Running. No-op for an empty batch or one that already left Idle.
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if self.tasks.is_empty() || self.control_state != ControlState::Idle {
            return false;
        }
        self.control_state = ControlState::Running;
        self.current_index = 0;
        self.started_at = Some(now);
        self.paused_at = None;
        self.total_paused_duration_ms = 0;
        true
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> bool {
        if self.control_state != ControlState::Running {
            return false;
        }
        self.control_state = ControlState::Paused;
        self.paused_at = Some(now);
        true
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> bool {
        if self.control_state != ControlState::Paused {
            return false;
        }
        if let Some(paused_at) = self.paused_at.take() {
            let paused_ms = (now - paused_at).num_milliseconds().max(0);
            self.total_paused_duration_ms += paused_ms;
        }
        self.control_state = ControlState::Running;
        true
    }

    /// Unconditional. The batch stays stopped until it is reset or re-initialized.
    pub fn stop(&mut self) -> bool {
        let changed = self.control_state != ControlState::Stopped;
        self.control_state = ControlState::Stopped;
        self.paused_at = None;
        changed
    }

    /// Also clears the outcome of any earlier attempt at the same task.
    pub fn mark_started(&mut self, index: i64) -> bool {
        self.update_task(index, |task| {
            task.status = TaskStatus::Running;
            task.error = None;
            task.processing_duration_ms = None;
        })
    }

    pub fn mark_completed(&mut self, index: i64, duration_ms: i64) -> bool {
        self.update_task(index, |task| {
            task.status = TaskStatus::Completed;
            task.error = None;
            task.processing_duration_ms = Some(duration_ms);
        })
    }

    pub fn mark_failed(&mut self, index: i64, error: impl Into<String>) -> bool {
        let error = error.into();
        self.update_task(index, |task| {
            task.status = TaskStatus::Failed;
            task.error = Some(error);
            task.processing_duration_ms = None;
        })
    }

    pub fn mark_skipped(&mut self, index: i64) -> bool {
        self.update_task(index, |task| {
            task.status = TaskStatus::Skipped;
        })
    }

    /// Moves to the next task while running, completing the batch past the end.
    pub fn advance(&mut self) -> bool {
        if self.control_state != ControlState::Running {
            return false;
        }
        self.current_index += 1;
        if self.current_index >= self.task_count() {
            self.control_state = ControlState::Completed;
        }
        true
    }

    /// Restores every field to its initial value. Callers must also bump the
    /// run generation so callbacks from the old run are dropped.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn update_task(&mut self, index: i64, apply: impl FnOnce(&mut FileTask)) -> bool {
        match self.task_mut(index) {
            Some(task) => {
                apply(task);
                true
            }
            None => false,
        }
    }

    fn task_mut(&mut self, index: i64) -> Option<&mut FileTask> {
        let i = usize::try_from(index).ok()?;
        self.tasks.get_mut(i)
    }

    pub fn task(&self, index: i64) -> Option<&FileTask> {
        let i = usize::try_from(index).ok()?;
        self.tasks.get(i)
    }

    /// The task at `current_index`, if the index is in range.
    pub fn current_task(&self) -> Option<&FileTask> {
        self.task(self.current_index)
    }

    pub fn task_count(&self) -> i64 {
        self.tasks.len() as i64
    }

    fn count_status(&self, status: TaskStatus) -> usize {
        self.tasks.iter().filter(|t| t.status == status).count()
    }

    pub fn completed_count(&self) -> usize {
        self.count_status(TaskStatus::Completed)
    }

    pub fn failed_count(&self) -> usize {
        self.count_status(TaskStatus::Failed)
    }

    pub fn skipped_count(&self) -> usize {
        self.count_status(TaskStatus::Skipped)
    }

    pub fn running_count(&self) -> usize {
        self.count_status(TaskStatus::Running)
    }

    /// Tasks in a terminal status: completed, failed or skipped.
    pub fn terminal_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.status.is_terminal()).count()
    }

    pub fn progress_percent(&self) -> f64 {
        if self.tasks.is_empty() {
            return 0.0;
        }
        self.terminal_count() as f64 / self.tasks.len() as f64 * 100.0
    }
}
