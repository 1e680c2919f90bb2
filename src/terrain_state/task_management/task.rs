//! # Task System Core Traits
//!
//! This module defines the unit of work executed by a [`TaskManager`](super::TaskManager).
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The output, or the panic that interrupted it, is sent back as a [`TaskOutcome`]
//! 4. The owner collects outcomes on its own thread with `TaskManager::drain_completed()`
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred to a worker
//! - `Task::Output` must be `Send` to be transferred back
//! - Tasks own everything they touch; shared state stays on the owner's thread

use std::any::Any;

/// A unit of work that can be executed on a background worker.
///
/// # Implementation Guidelines
/// - Should own all the data it needs (no borrowed or shared-mutable state)
/// - Should be relatively coarse-grained to amortize scheduling overhead
pub trait Task: Send + 'static {
    /// The value handed back to the owner thread.
    type Output: Send + 'static;

    /// Performs the work. Runs on a worker thread.
    fn process(self) -> Self::Output;
}

/// A task that panicked instead of returning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPanic {
    pub message: String,
}

impl TaskPanic {
    pub(crate) fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "unknown panic payload".to_string()
        };
        TaskPanic { message }
    }
}

/// What a worker sends back for each task it ran.
pub type TaskOutcome<O> = Result<O, TaskPanic>;
