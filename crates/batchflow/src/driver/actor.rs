//! Single-writer actor that owns the batch state and drives the engine.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use tokio::sync::{mpsc, oneshot, watch};

use crate::batch::{BatchSnapshot, BatchState, ControlState, FileTask, RunGuard};
use crate::broadcast::{BatchEventBroadcaster, BatchEventKind};
use crate::clock::Clock;
use crate::engine::{EngineOutcome, ExecutionEngine, RunContext};

/// Control operations accepted by the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ControlOp {
    Start,
    Pause,
    Resume,
    Stop,
    Reset,
}

pub(crate) enum Command {
    Initialize {
        folder_path: String,
        tasks: Vec<FileTask>,
        job_id: String,
        reply: oneshot::Sender<()>,
    },
    Control {
        op: ControlOp,
        reply: oneshot::Sender<ControlState>,
    },
    Snapshot {
        reply: oneshot::Sender<BatchSnapshot>,
    },
    Generation {
        reply: oneshot::Sender<u64>,
    },
    Shutdown,
}

/// Result of one engine invocation, tagged with the generation it was started in.
struct Completion {
    job_id: String,
    generation: u64,
    index: i64,
    started_at: DateTime<Utc>,
    outcome: EngineOutcome,
}

pub(crate) struct DriverActor {
    state: BatchState,
    guard: RunGuard,
    in_flight: bool,
    engine: Arc<dyn ExecutionEngine>,
    clock: Arc<dyn Clock>,
    events: BatchEventBroadcaster,
    snapshot_tx: watch::Sender<BatchSnapshot>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
}

impl DriverActor {
    pub(crate) fn new(
        engine: Arc<dyn ExecutionEngine>,
        clock: Arc<dyn Clock>,
        events: BatchEventBroadcaster,
        snapshot_tx: watch::Sender<BatchSnapshot>,
    ) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        Self {
            state: BatchState::new(),
            guard: RunGuard::new(),
            in_flight: false,
            engine,
            clock,
            events,
            snapshot_tx,
            completion_tx,
            completion_rx,
        }
    }

    pub(crate) async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        debug!("Batch driver started");

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(completion) = self.completion_rx.recv() => {
                    self.handle_completion(completion);
                    self.publish();
                }
            }
        }

        debug!("Batch driver stopped");
    }

    /// Commands that change state publish the new snapshot before replying.
    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Initialize {
                folder_path,
                tasks,
                job_id,
                reply,
            } => {
                let before = self.state.control_state;
                let previous_job = self.state.job_id.clone();
                self.invalidate_run();
                info!(
                    "Initialized batch {} with {} tasks from {}",
                    job_id,
                    tasks.len(),
                    folder_path
                );
                self.state.initialize(folder_path, tasks, job_id);
                if before != ControlState::Idle {
                    self.emit_for(
                        &previous_job,
                        BatchEventKind::ControlChanged {
                            state: ControlState::Idle,
                        },
                        self.clock.now(),
                    );
                }
                self.publish();
                let _ = reply.send(());
            }
            Command::Control { op, reply } => {
                self.apply_control(op);
                self.drive();
                self.publish();
                let _ = reply.send(self.state.control_state);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.state.clone());
            }
            Command::Generation { reply } => {
                let _ = reply.send(self.guard.generation());
            }
            Command::Shutdown => {}
        }
    }

    fn apply_control(&mut self, op: ControlOp) {
        let before = self.state.control_state;
        // Reset clears the job id; the change still belongs to the old job.
        let job_id = self.state.job_id.clone();
        let now = self.clock.now();

        match op {
            ControlOp::Start => {
                self.state.start(now);
            }
            ControlOp::Pause => {
                self.state.pause(now);
            }
            ControlOp::Resume => {
                self.state.resume(now);
            }
            ControlOp::Stop => {
                self.state.stop();
                self.invalidate_run();
            }
            ControlOp::Reset => {
                self.state.reset();
                self.invalidate_run();
            }
        }

        let after = self.state.control_state;
        if before != after {
            info!("Batch {}: {} -> {}", display_job(&job_id), before, after);
            self.emit_for(&job_id, BatchEventKind::ControlChanged { state: after }, now);
        } else {
            debug!("Batch control {:?} ignored in state {}", op, before);
        }
    }

    /// Orphans in-flight callbacks and releases the in-flight slot.
    fn invalidate_run(&mut self) {
        let generation = self.guard.invalidate();
        self.in_flight = false;
        debug!("Run generation advanced to {}", generation);
    }

    /// Dispatches the current task if the batch is running and nothing is in flight.
    ///
    /// Unmatched tasks are skipped in place, so a run of them settles in one call.
    fn drive(&mut self) {
        loop {
            if self.state.control_state != ControlState::Running || self.in_flight {
                return;
            }

            let index = self.state.current_index;
            let Some(task) = self.state.task(index).cloned() else {
                return;
            };
            let generation = self.guard.generation();
            self.in_flight = true;

            if !task.is_matched() {
                self.state.mark_skipped(index);
                debug!("Skipping {} (no matching slot)", task.name);
                self.emit(
                    BatchEventKind::TaskSkipped {
                        index,
                        name: task.name.clone(),
                    },
                    self.clock.now(),
                );
                self.in_flight = false;
                if self.guard.is_current(generation) {
                    self.advance();
                }
                continue;
            }

            self.state.mark_started(index);
            let started_at = self.clock.now();
            debug!("Dispatching {} (index {})", task.name, index);
            self.emit(
                BatchEventKind::TaskStarted {
                    index,
                    name: task.name.clone(),
                },
                started_at,
            );
            self.dispatch(task, index, generation, started_at);
            return;
        }
    }

    fn dispatch(&self, task: FileTask, index: i64, generation: u64, started_at: DateTime<Utc>) {
        let engine = Arc::clone(&self.engine);
        let completion_tx = self.completion_tx.clone();
        let ctx = RunContext {
            job_id: self.state.job_id.clone(),
            folder_path: self.state.folder_path.clone(),
            index,
            generation,
        };

        tokio::spawn(async move {
            let outcome = match engine.run(&task, &ctx).await {
                Ok(subscription) => subscription.outcome().await,
                Err(e) => EngineOutcome::Failed(e.to_string()),
            };

            // The actor may already be gone; nothing left to report to.
            let _ = completion_tx.send(Completion {
                job_id: ctx.job_id,
                generation,
                index,
                started_at,
                outcome,
            });
        });
    }

    fn handle_completion(&mut self, completion: Completion) {
        let now = self.clock.now();

        if !self.guard.is_current(completion.generation) {
            debug!(
                "Discarding stale completion for index {} of batch {} from generation {}",
                completion.index,
                display_job(&completion.job_id),
                completion.generation
            );
            self.emit_for(
                &completion.job_id,
                BatchEventKind::StaleCompletionDiscarded {
                    index: completion.index,
                    generation: completion.generation,
                },
                now,
            );
            return;
        }

        let index = completion.index;
        let name = self
            .state
            .task(index)
            .map(|t| t.name.clone())
            .unwrap_or_default();

        match completion.outcome {
            EngineOutcome::Succeeded => {
                let duration_ms = (now - completion.started_at).num_milliseconds().max(0);
                self.state.mark_completed(index, duration_ms);
                debug!("Completed {} in {}ms", name, duration_ms);
                self.emit(
                    BatchEventKind::TaskCompleted {
                        index,
                        name,
                        duration_ms,
                    },
                    now,
                );
            }
            EngineOutcome::Failed(reason) => {
                warn!("Task {} failed: {}", name, reason);
                self.state.mark_failed(index, reason.clone());
                self.emit(
                    BatchEventKind::TaskFailed {
                        index,
                        name,
                        error: reason,
                    },
                    now,
                );
            }
        }

        self.in_flight = false;
        if self.state.control_state == ControlState::Running {
            self.advance();
        }
        self.drive();
    }

    fn advance(&mut self) {
        if !self.state.advance() {
            return;
        }
        if self.state.control_state == ControlState::Completed {
            info!(
                "Batch {} completed: {} completed, {} failed, {} skipped",
                display_job(&self.state.job_id),
                self.state.completed_count(),
                self.state.failed_count(),
                self.state.skipped_count()
            );
            self.emit(
                BatchEventKind::ControlChanged {
                    state: ControlState::Completed,
                },
                self.clock.now(),
            );
        }
    }

    fn emit(&self, kind: BatchEventKind, at: DateTime<Utc>) {
        self.emit_for(&self.state.job_id, kind, at);
    }

    fn emit_for(&self, job_id: &str, kind: BatchEventKind, at: DateTime<Utc>) {
        self.events.emit(job_id, kind, at);
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.state.clone());
    }
}

fn display_job(job_id: &str) -> &str {
    if job_id.is_empty() {
        "<none>"
    } else {
        job_id
    }
}
