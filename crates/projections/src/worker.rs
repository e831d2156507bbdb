//! Task delivery: a channel-backed queue and the worker draining it.

use std::sync::Arc;
use std::time::Duration;

use domain::{Task, TaskQueue, TaskQueueError};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, error::TryRecvError};
use tokio::task::JoinHandle;

use crate::cache::CacheStore;
use crate::processor::CacheManager;

/// Task queue handing tasks to a [`TaskWorker`] over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelTaskQueue {
    sender: UnboundedSender<Task>,
}

impl TaskQueue for ChannelTaskQueue {
    fn enqueue(&self, task: Task) -> Result<(), TaskQueueError> {
        self.sender.send(task).map_err(|_| TaskQueueError::Closed)
    }
}

/// Creates a connected queue and receiver.
pub fn channel() -> (ChannelTaskQueue, UnboundedReceiver<Task>) {
    let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
    (ChannelTaskQueue { sender }, receiver)
}

/// Counts of a worker's outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub succeeded: usize,
    pub failed: usize,
}

/// Runs tasks against a [`CacheManager`].
///
/// A failed task is logged and dropped; every procedure recomputes from
/// current state, so the next task of the same procedure repairs the cache.
pub struct TaskWorker<C: CacheStore> {
    manager: Arc<CacheManager<C>>,
}

impl<C: CacheStore> TaskWorker<C> {
    pub fn new(manager: Arc<CacheManager<C>>) -> Self {
        Self { manager }
    }

    async fn process(&self, task: Task, stats: &mut WorkerStats) {
        match self.manager.handle(&task).await {
            Ok(()) => stats.succeeded += 1,
            Err(e) => {
                stats.failed += 1;
                metrics::counter!("tasks_failed_total").increment(1);
                tracing::error!(task_id = %task.id, procedure = %task.procedure, error = %e, "task failed");
            }
        }
    }

    /// Runs every given task in order.
    pub async fn run_all(&self, tasks: impl IntoIterator<Item = Task>) -> WorkerStats {
        let mut stats = WorkerStats::default();
        for task in tasks {
            self.process(task, &mut stats).await;
        }
        stats
    }

    /// Runs the tasks already waiting in `receiver` without blocking.
    pub async fn process_pending(&self, receiver: &mut UnboundedReceiver<Task>) -> WorkerStats {
        let mut stats = WorkerStats::default();
        loop {
            match receiver.try_recv() {
                Ok(task) => self.process(task, &mut stats).await,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        stats
    }

    /// Runs tasks until every queue handle is dropped.
    pub async fn run(self, mut receiver: UnboundedReceiver<Task>) -> WorkerStats {
        tracing::info!("task worker started");
        let mut stats = WorkerStats::default();
        while let Some(task) = receiver.recv().await {
            self.process(task, &mut stats).await;
        }
        tracing::info!(succeeded = stats.succeeded, failed = stats.failed, "task worker stopped");
        stats
    }
}

impl<C: CacheStore + 'static> TaskWorker<C> {
    /// Spawns [`TaskWorker::run`] on the runtime.
    pub fn spawn(self, receiver: UnboundedReceiver<Task>) -> JoinHandle<WorkerStats> {
        tokio::spawn(self.run(receiver))
    }
}

/// Recomputes the announcement every `period`, starting immediately.
pub fn spawn_announcement_refresh<C>(manager: Arc<CacheManager<C>>, period: Duration) -> JoinHandle<()>
where
    C: CacheStore + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            if let Err(e) = manager.refresh_announcement().await {
                tracing::warn!(error = %e, "announcement refresh failed");
            }
        }
    })
}
