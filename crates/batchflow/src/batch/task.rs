use serde::{Deserialize, Serialize};

/// Status of a single file within a batch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

impl TaskStatus {
    /// Returns true for statuses a task does not leave within the same run.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Skipped
        )
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "Pending"),
            TaskStatus::Running => write!(f, "Running"),
            TaskStatus::Completed => write!(f, "Completed"),
            TaskStatus::Failed => write!(f, "Failed"),
            TaskStatus::Skipped => write!(f, "Skipped"),
        }
    }
}

/// One file queued for processing.
///
/// Identity and matching fields are fixed at construction; only `status`,
/// `error` and `processing_duration_ms` change, and only through
/// [`BatchState`](crate::batch::BatchState).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTask {
    pub path: String,
    pub name: String,
    /// Sniffed MIME type, e.g. "image/png".
    pub content_type: String,
    /// Type of the slot this file was matched to, `None` when nothing accepts it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_slot_type: Option<String>,
    /// Engine input the file is bound to. Tasks without one are skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_slot_id: Option<String>,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_duration_ms: Option<i64>,
}

impl FileTask {
    fn new_internal(
        path: String,
        name: String,
        content_type: String,
        matched_slot_type: Option<String>,
        target_slot_id: Option<String>,
    ) -> Self {
        Self {
            path,
            name,
            content_type,
            matched_slot_type,
            target_slot_id,
            status: TaskStatus::Pending,
            error: None,
            processing_duration_ms: None,
        }
    }

    /// Creates a task bound to an engine slot.
    pub fn matched(
        path: impl Into<String>,
        name: impl Into<String>,
        content_type: impl Into<String>,
        slot_type: impl Into<String>,
        slot_id: impl Into<String>,
    ) -> Self {
        Self::new_internal(
            path.into(),
            name.into(),
            content_type.into(),
            Some(slot_type.into()),
            Some(slot_id.into()),
        )
    }

    /// Creates a task that no slot accepted. It will be skipped when reached.
    pub fn unmatched(
        path: impl Into<String>,
        name: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self::new_internal(path.into(), name.into(), content_type.into(), None, None)
    }

    pub fn is_matched(&self) -> bool {
        self.target_slot_id.is_some()
    }
}
