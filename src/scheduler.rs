//! An in-process scheduler that drives a fixed list of tasks through a
//! [`SchedulerBridge`](crate::bridge::SchedulerBridge).
//!
//! Every dispatched task parks on a one-shot channel registered under its id
//! until the bridge answers it, so at most `concurrency` tasks are ever
//! waiting on the resolution layer at once.

use std::{
    collections::{BTreeMap, HashMap},
    num::NonZeroUsize,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use log::{debug, error, warn};
use tokio::{
    sync::{oneshot, Semaphore},
    task::JoinSet,
};

use crate::{
    bridge::{BridgeHandle, Scheduler},
    task::{Task, TaskId},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed(Vec<PathBuf>),
    Failed(String),
}

#[derive(Debug, Default)]
pub struct LocalScheduler {
    tasks: Mutex<Vec<Task>>,
    pending: Mutex<HashMap<TaskId, oneshot::Sender<TaskOutcome>>>,
    outcomes: Mutex<BTreeMap<TaskId, TaskOutcome>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl LocalScheduler {
    pub fn new<I>(tasks: I) -> Self
    where
        I: IntoIterator<Item = Task>,
    {
        Self {
            tasks: Mutex::new(tasks.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Outcomes recorded so far, keyed by task id.
    pub fn outcomes(&self) -> BTreeMap<TaskId, TaskOutcome> {
        lock(&self.outcomes).clone()
    }

    fn wake(&self, id: &TaskId, outcome: TaskOutcome) {
        match lock(&self.pending).remove(id) {
            Some(sender) => {
                // the receiver only goes away if dispatch gave up on the task
                let _ = sender.send(outcome);
            }
            None => warn!("ignoring answer for unknown task {}", id),
        }
    }

    async fn dispatch(self: Arc<Self>, concurrency: NonZeroUsize, bridge: BridgeHandle) {
        let tasks = std::mem::take(&mut *lock(&self.tasks));
        let semaphore = Arc::new(Semaphore::new(concurrency.get()));
        let mut in_flight = JoinSet::new();

        for task in tasks {
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(err) => {
                    error!("unable to dispatch task {}: {}", task.id, err);
                    break;
                }
            };

            let (sender, receiver) = oneshot::channel();
            lock(&self.pending).insert(task.id.clone(), sender);
            if let Err(err) = bridge.on_resolve_inputs(task.id.clone(), &task.workspace) {
                error!("unable to dispatch task {}: {}", task.id, err);
                lock(&self.pending).remove(&task.id);
                continue;
            }
            debug!("dispatched task {} for {:?}", task.id, task.workspace);

            let scheduler = Arc::clone(&self);
            in_flight.spawn(async move {
                let outcome = receiver.await.unwrap_or_else(|_| {
                    TaskOutcome::Failed(String::from("task was dropped before completing"))
                });
                drop(permit);
                lock(&scheduler.outcomes).insert(task.id, outcome);
            });
        }

        while let Some(joined) = in_flight.join_next().await {
            if let Err(err) = joined {
                error!("task waiter did not finish: {}", err);
            }
        }

        if let Err(err) = bridge.on_finish() {
            error!("unable to finish run: {}", err);
        }
    }
}

impl Scheduler for LocalScheduler {
    fn start(self: Arc<Self>, concurrency: NonZeroUsize, bridge: BridgeHandle) {
        tokio::spawn(self.dispatch(concurrency, bridge));
    }

    fn complete_task(&self, id: &TaskId, payload: String) {
        let outcome = match serde_json::from_str::<Vec<PathBuf>>(&payload) {
            Ok(files) => TaskOutcome::Completed(files),
            Err(err) => TaskOutcome::Failed(format!("unreadable payload: {}", err)),
        };
        self.wake(id, outcome);
    }

    fn fail_task(&self, id: &TaskId, reason: String) {
        self.wake(id, TaskOutcome::Failed(reason));
    }
}
