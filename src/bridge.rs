//! The boundary between the scheduler that decides which workspaces need
//! resolving and the plugins that resolve them.
//!
//! A run moves through three states. [`SchedulerBridge::run`] leaves
//! [`RunState::Idle`], hands the scheduler a [`BridgeHandle`], and waits. The
//! scheduler dispatches tasks through [`BridgeHandle::on_resolve_inputs`]; each
//! task is aggregated on its own tokio task and answered exactly once through
//! [`Scheduler::complete_task`] or [`Scheduler::fail_task`]. When the
//! scheduler has seen every completion it will ever need it calls
//! [`BridgeHandle::on_finish`], the run becomes [`RunState::Finished`] and
//! `run` returns. Work still in flight at that point is discarded.
//!
//! Answers and the finish signal are serialized: `on_finish` waits for an
//! answer already being delivered, and no answer is delivered once it has
//! returned. A scheduler may call `on_finish` from inside `complete_task` or
//! `fail_task`.

use std::{
    cell::Cell,
    fmt::Debug,
    num::NonZeroUsize,
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use log::{debug, error, info, warn};
use tokio::sync::watch;

use crate::{
    aggregate::{Aggregation, TaskAggregator},
    registry::PluginRegistry,
    task::{Task, TaskId},
};

thread_local! {
    // set while this thread delivers an answer to the scheduler
    static ANSWERING: Cell<bool> = Cell::new(false);
}

/// Marks the current thread as answering until dropped.
struct Answering;

impl Answering {
    fn enter() -> Self {
        ANSWERING.with(|answering| answering.set(true));
        Self
    }

    fn is_active() -> bool {
        ANSWERING.with(Cell::get)
    }
}

impl Drop for Answering {
    fn drop(&mut self) {
        ANSWERING.with(|answering| answering.set(false));
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Finished,
}

/// The external scheduler, seen from the resolution layer.
///
/// The scheduler owns ordering and the concurrency limit; the bridge adds
/// neither.
pub trait Scheduler: Send + Sync + 'static {
    /// Begin dispatching tasks through `bridge`, keeping at most
    /// `concurrency` of them in flight. Must not block.
    fn start(self: Arc<Self>, concurrency: NonZeroUsize, bridge: BridgeHandle);

    /// `payload` is a JSON array of absolute, unique path strings.
    fn complete_task(&self, id: &TaskId, payload: String);

    fn fail_task(&self, id: &TaskId, reason: String);
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BridgeError {
    #[error("the run has not started")]
    NotStarted,
    #[error("the run has already finished")]
    Finished,
}

struct Run {
    aggregator: TaskAggregator,
    scheduler: Arc<dyn Scheduler>,
    state: watch::Sender<RunState>,
    answers: Mutex<()>,
}

impl Run {
    fn state(&self) -> RunState {
        *self.state.borrow()
    }

    fn lock_answers(&self) -> MutexGuard<'_, ()> {
        self.answers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn resolve(&self, task: Task) {
        let aggregation = self.aggregator.aggregate(&task.workspace).await;
        self.answer(task, aggregation);
    }

    fn answer(&self, task: Task, aggregation: Aggregation) {
        let _answers = self.lock_answers();
        if self.state() == RunState::Finished {
            debug!("discarding result of task {} after finish", task.id);
            return;
        }

        let _answering = Answering::enter();

        match aggregation.files.to_payload() {
            Ok(payload) => {
                debug!(
                    "task {} resolved {} inputs for {:?}",
                    task.id,
                    aggregation.files.len(),
                    task.workspace
                );
                self.scheduler.complete_task(&task.id, payload);
            }
            Err(err) => {
                error!(
                    "task {} failed for {:?}: {}",
                    task.id, task.workspace, err
                );
                self.scheduler.fail_task(&task.id, err.to_string());
            }
        }
    }
}

/// The callbacks a scheduler uses during one run.
#[derive(Clone)]
pub struct BridgeHandle {
    run: Arc<Run>,
}

impl Debug for BridgeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeHandle")
            .field("state", &self.run.state())
            .finish()
    }
}

impl BridgeHandle {
    pub fn state(&self) -> RunState {
        self.run.state()
    }

    /// Start resolving `workspace` in the background. The answer arrives
    /// later through the scheduler's `complete_task` or `fail_task`.
    pub fn on_resolve_inputs<I, P>(&self, id: I, workspace: P) -> Result<(), BridgeError>
    where
        I: Into<TaskId>,
        P: AsRef<Path>,
    {
        let task = Task::new(id, workspace);
        match self.run.state() {
            RunState::Running => {}
            RunState::Idle => return Err(BridgeError::NotStarted),
            RunState::Finished => {
                warn!("rejecting task {} received after finish", task.id);
                return Err(BridgeError::Finished);
            }
        }

        let run = Arc::clone(&self.run);
        tokio::spawn(async move { run.resolve(task).await });
        Ok(())
    }

    /// Signal that no further tasks will be dispatched or awaited.
    pub fn on_finish(&self) -> Result<(), BridgeError> {
        // from inside an answer the lock is already held by this thread
        let _answers = (!Answering::is_active()).then(|| self.run.lock_answers());
        let mut previous = RunState::Idle;
        self.run.state.send_if_modified(|state| {
            previous = *state;
            if *state == RunState::Running {
                *state = RunState::Finished;
                true
            } else {
                false
            }
        });

        match previous {
            RunState::Running => {
                debug!("run finished");
                Ok(())
            }
            RunState::Idle => Err(BridgeError::NotStarted),
            RunState::Finished => {
                warn!("ignoring repeated finish signal");
                Err(BridgeError::Finished)
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct SchedulerBridge {
    aggregator: TaskAggregator,
}

impl SchedulerBridge {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self {
            aggregator: TaskAggregator::new(registry),
        }
    }

    /// Hand `scheduler` the callbacks for a new run and wait for its finish
    /// signal.
    pub async fn run<S: Scheduler>(&self, scheduler: Arc<S>, concurrency: NonZeroUsize) {
        let (state, mut finished) = watch::channel(RunState::Idle);
        let handle = BridgeHandle {
            run: Arc::new(Run {
                aggregator: self.aggregator.clone(),
                scheduler: Arc::clone(&scheduler) as Arc<dyn Scheduler>,
                state,
                answers: Mutex::new(()),
            }),
        };

        handle.run.state.send_replace(RunState::Running);
        info!("starting run with concurrency {}", concurrency);
        scheduler.start(concurrency, handle.clone());

        // the handle above keeps the sender alive, so this only returns once
        // the state reaches Finished
        let _ = finished
            .wait_for(|state| *state == RunState::Finished)
            .await;
    }
}
