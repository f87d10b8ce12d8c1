//! Batch driver: owns a batch and feeds its tasks to the execution engine one
//! at a time.
//!
//! All state lives inside a single tokio task. [`BatchHandle`] sends it
//! commands; engine results come back through an internal channel tagged with
//! the run generation they were started under, so results from a stopped,
//! reset or replaced batch are dropped instead of applied.

mod actor;

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot, watch};

use crate::batch::{BatchProgress, BatchSnapshot, BatchState, ControlState, FileTask};
use crate::broadcast::{BatchEvent, BatchEventBroadcaster};
use crate::clock::{Clock, SystemClock};
use crate::config::BatchConfig;
use crate::engine::ExecutionEngine;
use crate::error::DriverError;

use actor::{Command, ControlOp, DriverActor};

/// Builder for a batch driver.
pub struct BatchDriver {
    engine: Arc<dyn ExecutionEngine>,
    clock: Arc<dyn Clock>,
    events: BatchEventBroadcaster,
}

impl BatchDriver {
    pub fn new(engine: Arc<dyn ExecutionEngine>) -> Self {
        Self {
            engine,
            clock: Arc::new(SystemClock),
            events: BatchEventBroadcaster::default(),
        }
    }

    /// Applies settings from a loaded configuration.
    pub fn with_config(mut self, config: &BatchConfig) -> Self {
        self.events = BatchEventBroadcaster::new(config.event_capacity);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_events(mut self, events: BatchEventBroadcaster) -> Self {
        self.events = events;
        self
    }

    /// Spawns the driver on the current tokio runtime.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn spawn(self) -> BatchHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(BatchState::new());

        let actor = DriverActor::new(
            self.engine,
            Arc::clone(&self.clock),
            self.events.clone(),
            snapshot_tx,
        );
        tokio::spawn(actor.run(command_rx));

        BatchHandle {
            commands: command_tx,
            snapshot_rx,
            clock: self.clock,
            events: self.events,
        }
    }
}

/// Cloneable control surface for a running driver.
///
/// Commands are applied in the order they are sent. Each call resolves once
/// the driver has applied it.
#[derive(Clone)]
pub struct BatchHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshot_rx: watch::Receiver<BatchSnapshot>,
    clock: Arc<dyn Clock>,
    events: BatchEventBroadcaster,
}

impl BatchHandle {
    /// Replaces the current batch with an idle one over `tasks`.
    ///
    /// Results still pending from the previous batch are discarded.
    pub async fn initialize(
        &self,
        folder_path: impl Into<String>,
        tasks: Vec<FileTask>,
        job_id: impl Into<String>,
    ) -> Result<(), DriverError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Initialize {
            folder_path: folder_path.into(),
            tasks,
            job_id: job_id.into(),
            reply,
        })?;
        rx.await.map_err(|_| DriverError::Closed)
    }

    pub async fn start(&self) -> Result<ControlState, DriverError> {
        self.control(ControlOp::Start).await
    }

    pub async fn pause(&self) -> Result<ControlState, DriverError> {
        self.control(ControlOp::Pause).await
    }

    pub async fn resume(&self) -> Result<ControlState, DriverError> {
        self.control(ControlOp::Resume).await
    }

    /// Stops the batch immediately. An engine invocation already in flight
    /// keeps running, but its result will be ignored.
    pub async fn stop(&self) -> Result<ControlState, DriverError> {
        self.control(ControlOp::Stop).await
    }

    pub async fn reset(&self) -> Result<ControlState, DriverError> {
        self.control(ControlOp::Reset).await
    }

    pub async fn snapshot(&self) -> Result<BatchSnapshot, DriverError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply })?;
        rx.await.map_err(|_| DriverError::Closed)
    }

    /// Progress summary computed at the driver clock's current time.
    pub async fn progress(&self) -> Result<BatchProgress, DriverError> {
        let snapshot = self.snapshot().await?;
        Ok(BatchProgress::from_snapshot(&snapshot, self.clock.now()))
    }

    pub async fn generation(&self) -> Result<u64, DriverError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Generation { reply })?;
        rx.await.map_err(|_| DriverError::Closed)
    }

    /// Receiver that always holds the latest published snapshot.
    pub fn watch(&self) -> watch::Receiver<BatchSnapshot> {
        self.snapshot_rx.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<BatchEvent> {
        self.events.subscribe()
    }

    /// Stops the driver task. Later calls on any handle return
    /// [`DriverError::Closed`].
    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }

    async fn control(&self, op: ControlOp) -> Result<ControlState, DriverError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Control { op, reply })?;
        rx.await.map_err(|_| DriverError::Closed)
    }

    fn send(&self, command: Command) -> Result<(), DriverError> {
        self.commands.send(command).map_err(|_| DriverError::Closed)
    }
}
