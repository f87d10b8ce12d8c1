//! Batch event broadcaster for real-time progress streaming.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::batch::ControlState;

/// What happened in a batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BatchEventKind {
    ControlChanged {
        state: ControlState,
    },
    TaskStarted {
        index: i64,
        name: String,
    },
    #[serde(rename_all = "camelCase")]
    TaskCompleted {
        index: i64,
        name: String,
        duration_ms: i64,
    },
    TaskFailed {
        index: i64,
        name: String,
        error: String,
    },
    TaskSkipped {
        index: i64,
        name: String,
    },
    StaleCompletionDiscarded {
        index: i64,
        generation: u64,
    },
}

/// Event envelope sent to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchEvent {
    /// Batch the event belongs to.
    pub job_id: String,
    #[serde(flatten)]
    pub kind: BatchEventKind,
    pub timestamp: DateTime<Utc>,
}

impl BatchEvent {
    pub fn new(job_id: &str, kind: BatchEventKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            job_id: job_id.to_string(),
            kind,
            timestamp,
        }
    }
}

/// Broadcasts batch events for streaming.
#[derive(Clone)]
pub struct BatchEventBroadcaster {
    sender: Arc<broadcast::Sender<BatchEvent>>,
}

impl BatchEventBroadcaster {
    /// Creates a new broadcaster with the specified channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Sends an event to all subscribers.
    pub fn send(&self, event: BatchEvent) {
        // Ignore errors - no active receivers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BatchEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, job_id: &str, kind: BatchEventKind, timestamp: DateTime<Utc>) {
        self.send(BatchEvent::new(job_id, kind, timestamp));
    }
}

impl Default for BatchEventBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}
