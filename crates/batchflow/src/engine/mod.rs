//! Execution engine boundary.
//!
//! The engine runs one task at a time and reports how it went through a
//! stream of state transitions rather than a return value. The driver
//! subscribes before work starts, waits for exactly one terminal transition
//! and then drops the subscription.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::warn;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::batch::FileTask;
use crate::error::EngineError;

const DEFAULT_ERROR_MESSAGE: &str = "Execution failed";
const DEFAULT_CANCELLED_MESSAGE: &str = "Execution was cancelled";
const CLOSED_MESSAGE: &str = "Execution engine closed the subscription before finishing";

/// Externally visible state of the execution engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Idle,
    Running,
    Error,
    Cancelled,
}

/// One change of engine state, with an optional status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineTransition {
    pub from: EngineState,
    pub to: EngineState,
    pub message: Option<String>,
}

impl EngineTransition {
    /// Maps a transition to a final outcome, or `None` if the run is still going.
    pub fn outcome(&self) -> Option<EngineOutcome> {
        match (self.from, self.to) {
            (EngineState::Running, EngineState::Idle) => Some(EngineOutcome::Succeeded),
            (EngineState::Running, EngineState::Error) => Some(EngineOutcome::Failed(
                self.message_or(DEFAULT_ERROR_MESSAGE),
            )),
            (EngineState::Running, EngineState::Cancelled) => Some(EngineOutcome::Failed(
                self.message_or(DEFAULT_CANCELLED_MESSAGE),
            )),
            _ => None,
        }
    }

    fn message_or(&self, fallback: &str) -> String {
        self.message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

/// How a single engine invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineOutcome {
    Succeeded,
    Failed(String),
}

/// Identifies the batch and position an invocation belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub job_id: String,
    pub folder_path: String,
    pub index: i64,
    pub generation: u64,
}

/// Live subscription to the transitions of one engine invocation.
///
/// Dropping it unsubscribes.
pub struct EngineSubscription {
    receiver: broadcast::Receiver<EngineTransition>,
}

impl EngineSubscription {
    pub fn new(receiver: broadcast::Receiver<EngineTransition>) -> Self {
        Self { receiver }
    }

    /// Waits for the first terminal transition and unsubscribes.
    pub async fn outcome(mut self) -> EngineOutcome {
        loop {
            match self.receiver.recv().await {
                Ok(transition) => {
                    if let Some(outcome) = transition.outcome() {
                        return outcome;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Engine subscription lagged, skipped {} transitions", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return EngineOutcome::Failed(CLOSED_MESSAGE.to_string());
                }
            }
        }
    }
}

/// Runs one task and reports completion through an [`EngineSubscription`].
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Starts work on `task` and returns immediately.
    ///
    /// An `Err` is a synchronous rejection; the task is recorded as failed with
    /// the error's message.
    async fn run(
        &self,
        task: &FileTask,
        ctx: &RunContext,
    ) -> Result<EngineSubscription, EngineError>;
}

/// Tracks engine state and broadcasts every change to subscribers.
///
/// Engine implementations hand out [`TransitionBroadcaster::subscribe`] from
/// `run` before starting work so no transition can be missed.
#[derive(Clone)]
pub struct TransitionBroadcaster {
    sender: Arc<broadcast::Sender<EngineTransition>>,
    state: Arc<Mutex<EngineState>>,
}

impl TransitionBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
            state: Arc::new(Mutex::new(EngineState::Idle)),
        }
    }

    pub fn subscribe(&self) -> EngineSubscription {
        EngineSubscription::new(self.sender.subscribe())
    }

    pub fn state(&self) -> EngineState {
        *self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Moves to `to` and notifies subscribers. Returns the emitted transition.
    pub fn transition(&self, to: EngineState, message: Option<String>) -> EngineTransition {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        let transition = EngineTransition {
            from: *state,
            to,
            message,
        };
        *state = to;
        // No subscribers is fine
        let _ = self.sender.send(transition.clone());
        transition
    }
}

impl Default for TransitionBroadcaster {
    fn default() -> Self {
        Self::new(16)
    }
}
