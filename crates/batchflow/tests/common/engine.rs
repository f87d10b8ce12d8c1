//! Execution engines for driving the batch in tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use batchflow::{
    EngineError, EngineState, EngineSubscription, ExecutionEngine, FileTask, RunContext,
    TransitionBroadcaster,
};

use super::builders::WAIT_TIMEOUT;

/// One outstanding engine run. Dropping it without finishing closes the
/// subscription, which the driver records as a failure.
pub struct Invocation {
    pub task: FileTask,
    pub ctx: RunContext,
    transitions: TransitionBroadcaster,
}

impl Invocation {
    pub fn succeed(&self) {
        self.transitions.transition(EngineState::Idle, None);
    }

    pub fn fail(&self, message: &str) {
        self.transitions
            .transition(EngineState::Error, Some(message.to_string()));
    }

    pub fn cancel(&self) {
        self.transitions.transition(EngineState::Cancelled, None);
    }
}

/// Engine whose runs stay open until the test finishes them.
pub struct ManualEngine {
    started_tx: mpsc::UnboundedSender<Invocation>,
    started_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Invocation>>,
    rejections: Mutex<HashMap<String, String>>,
    runs: AtomicUsize,
}

impl ManualEngine {
    pub fn new() -> Self {
        let (started_tx, started_rx) = mpsc::unbounded_channel();
        Self {
            started_tx,
            started_rx: tokio::sync::Mutex::new(started_rx),
            rejections: Mutex::new(HashMap::new()),
            runs: AtomicUsize::new(0),
        }
    }

    /// Makes `run` reject the named task synchronously.
    pub fn reject(&self, name: &str, message: &str) {
        self.rejections
            .lock()
            .unwrap()
            .insert(name.to_string(), message.to_string());
    }

    /// Number of times `run` was called, rejected calls included.
    pub fn run_count(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub async fn next_invocation(&self) -> Invocation {
        let mut rx = self.started_rx.lock().await;
        tokio::time::timeout(WAIT_TIMEOUT, rx.recv())
            .await
            .expect("timed out waiting for an engine invocation")
            .expect("engine channel closed")
    }

    /// Returns an invocation if one was already started.
    pub async fn try_next_invocation(&self) -> Option<Invocation> {
        self.started_rx.lock().await.try_recv().ok()
    }
}

#[async_trait]
impl ExecutionEngine for ManualEngine {
    async fn run(
        &self,
        task: &FileTask,
        ctx: &RunContext,
    ) -> Result<EngineSubscription, EngineError> {
        self.runs.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self.rejections.lock().unwrap().get(&task.name) {
            return Err(EngineError::Rejected(message.clone()));
        }

        let transitions = TransitionBroadcaster::default();
        let subscription = transitions.subscribe();
        transitions.transition(EngineState::Running, None);

        let _ = self.started_tx.send(Invocation {
            task: task.clone(),
            ctx: ctx.clone(),
            transitions,
        });

        Ok(subscription)
    }
}

/// Engine that finishes every run immediately. Tasks whose name contains
/// "corrupt" fail with an engine error.
pub struct AutoEngine;

#[async_trait]
impl ExecutionEngine for AutoEngine {
    async fn run(
        &self,
        task: &FileTask,
        _ctx: &RunContext,
    ) -> Result<EngineSubscription, EngineError> {
        let transitions = TransitionBroadcaster::default();
        let subscription = transitions.subscribe();
        transitions.transition(EngineState::Running, None);
        if task.name.contains("corrupt") {
            transitions.transition(EngineState::Error, Some("decode failed".to_string()));
        } else {
            transitions.transition(EngineState::Idle, None);
        }
        Ok(subscription)
    }
}
