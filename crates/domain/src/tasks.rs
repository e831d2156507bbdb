//! Fire-and-forget background tasks.
//!
//! Tasks are delivered at least once and in no particular order, so every
//! procedure they name must be idempotent.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use datastore::Key;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Recomputes the nearly-sold-out announcement.
pub const SET_ANNOUNCEMENT: &str = "set_announcement";

/// Recomputes the featured speaker summary for one speaker.
pub const SET_FEATURED_SPEAKER: &str = "set_featured_speaker";

/// Sends a conference creation confirmation to the organizer.
pub const SEND_CONFIRMATION_EMAIL: &str = "send_confirmation_email";

/// Websafe key of the speaker a featured-speaker task is about.
pub const PARAM_SPEAKER_KEY: &str = "speaker_key";
pub const PARAM_EMAIL: &str = "email";
pub const PARAM_CONFERENCE_INFO: &str = "conference_info";

/// Errors raised while enqueueing a task.
#[derive(Debug, Error)]
pub enum TaskQueueError {
    /// The consumer side of the queue is gone.
    #[error("Task queue is closed")]
    Closed,

    /// The queue refused the task.
    #[error("Task rejected: {0}")]
    Rejected(String),
}

/// A named procedure invocation with string parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub procedure: String,
    pub params: BTreeMap<String, String>,
    pub enqueued_at: DateTime<Utc>,
}

impl Task {
    /// Creates a task with no parameters.
    pub fn new(procedure: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            procedure: procedure.into(),
            params: BTreeMap::new(),
            enqueued_at: Utc::now(),
        }
    }

    /// Adds a parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Returns a parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn set_announcement() -> Self {
        Self::new(SET_ANNOUNCEMENT)
    }

    pub fn set_featured_speaker(speaker: &Key) -> Self {
        Self::new(SET_FEATURED_SPEAKER).with_param(PARAM_SPEAKER_KEY, speaker.websafe())
    }

    pub fn send_confirmation_email(email: impl Into<String>, info: impl Into<String>) -> Self {
        Self::new(SEND_CONFIRMATION_EMAIL)
            .with_param(PARAM_EMAIL, email)
            .with_param(PARAM_CONFERENCE_INFO, info)
    }
}

/// Fire-and-forget task dispatcher.
///
/// Enqueueing never waits for the task to run.
pub trait TaskQueue: Send + Sync {
    /// Hands a task to the dispatcher.
    fn enqueue(&self, task: Task) -> Result<(), TaskQueueError>;
}

impl<T: TaskQueue + ?Sized> TaskQueue for Arc<T> {
    fn enqueue(&self, task: Task) -> Result<(), TaskQueueError> {
        (**self).enqueue(task)
    }
}

/// Task queue that records tasks instead of running them.
///
/// Useful for testing and for draining tasks by hand.
#[derive(Debug, Clone, Default)]
pub struct RecordingTaskQueue {
    tasks: Arc<Mutex<Vec<Task>>>,
}

impl RecordingTaskQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every recorded task, oldest first.
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.lock().map(|t| t.clone()).unwrap_or_default()
    }

    /// Removes and returns every recorded task, oldest first.
    pub fn drain(&self) -> Vec<Task> {
        self.tasks
            .lock()
            .map(|mut t| std::mem::take(&mut *t))
            .unwrap_or_default()
    }

    /// Returns the recorded tasks naming `procedure`.
    pub fn tasks_for(&self, procedure: &str) -> Vec<Task> {
        self.tasks()
            .into_iter()
            .filter(|t| t.procedure == procedure)
            .collect()
    }
}

impl TaskQueue for RecordingTaskQueue {
    fn enqueue(&self, task: Task) -> Result<(), TaskQueueError> {
        self.tasks
            .lock()
            .map_err(|e| TaskQueueError::Rejected(e.to_string()))?
            .push(task);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn featured_speaker_task_carries_websafe_key() {
        let key = Key::named("Speaker", "ada");
        let task = Task::set_featured_speaker(&key);
        assert_eq!(task.procedure, SET_FEATURED_SPEAKER);
        assert_eq!(
            Key::from_websafe(task.param(PARAM_SPEAKER_KEY).unwrap()).unwrap(),
            key
        );
    }

    #[test]
    fn recording_queue_drains_in_order() {
        let queue = RecordingTaskQueue::new();
        queue.enqueue(Task::set_announcement()).unwrap();
        queue
            .enqueue(Task::send_confirmation_email("a@example.com", "PyCon"))
            .unwrap();

        assert_eq!(queue.tasks_for(SET_ANNOUNCEMENT).len(), 1);
        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[1].param(PARAM_EMAIL), Some("a@example.com"));
        assert!(queue.tasks().is_empty());
    }
}
