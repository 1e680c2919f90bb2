//! # Task Management System
//!
//! This module provides a small worker-pool for executing [`Task`]s off the
//! cooperative thread.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: Owns the workers, distributes tasks and collects outcomes
//! - `TaskChannel`: The pair of channels connecting the owner to one worker
//! - `Task`: A unit of work that is moved to a worker and run there
//!
//! Each worker is an OS thread with a dedicated task channel and result
//! channel. A worker accepts at most [`MAX_TASKS_IN_FLIGHT`] tasks at a time;
//! everything else waits in a FIFO queue on the owner's side. With a single
//! worker this gives strict FIFO completion with one task in flight.
//!
//! ## Task Lifecycle
//! 1. Tasks are published via `TaskManager::publish_task()`
//! 2. The manager sends them to an available worker using round-robin, or queues them
//! 3. Workers run them and send back a [`TaskOutcome`]; a panic is caught and sent back too
//! 4. The owner calls `drain_completed()` once per frame to collect outcomes
//! 5. The owner calls `process_queued_tasks()` to hand queued work to freed workers
//!
//! ## Example Usage
//! ```ignore
//! let mut task_manager = TaskManager::<MyTask>::new(1, "my-worker")?;
//! task_manager.publish_task(MyTask::new(...));
//!
//! // In the frame loop:
//! for outcome in task_manager.drain_completed() { /* ... */ }
//! task_manager.process_queued_tasks();
//! ```

pub mod task;

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use log::info;
pub use task::{Task, TaskOutcome, TaskPanic};

/// A communication channel between the owner thread and one worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from the owner to the worker
/// - `result_receiver`: Receives task outcomes from the worker
/// - `num_tasks_in_flight`: Number of tasks sent but not yet collected
/// - `_worker`: Handle to the worker thread
///
/// Dropping the channel closes `task_sender`, which ends the worker's loop.
struct TaskChannel<T: Task> {
    task_sender: Sender<T>,
    result_receiver: Receiver<TaskOutcome<T::Output>>,
    num_tasks_in_flight: usize,
    connected: bool,
    _worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// # Fields
/// - `channels`: Set of worker channels
/// - `queued_tasks`: Tasks waiting for an available worker
/// - `current_channel`: Index for round-robin scheduling
pub struct TaskManager<T: Task> {
    channels: Vec<TaskChannel<T>>,
    queued_tasks: VecDeque<T>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// This is set to 1 to ensure tasks are processed in order within each channel.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl<T: Task> TaskManager<T> {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create
    /// * `name` - Thread name prefix, shown in panic messages and debuggers
    ///
    /// # Errors
    /// Returns the OS error if a worker thread cannot be spawned.
    pub fn new(num_workers: usize, name: &str) -> std::io::Result<Self> {
        let mut channels = Vec::with_capacity(num_workers);

        for index in 0..num_workers {
            let (task_tx, task_rx) = channel::<T>();
            let (result_tx, result_rx) = channel::<TaskOutcome<T::Output>>();

            let task_closure = move || {
                while let Ok(task) = task_rx.recv() {
                    let outcome = panic::catch_unwind(AssertUnwindSafe(move || task.process()))
                        .map_err(TaskPanic::from_payload);
                    if result_tx.send(outcome).is_err() {
                        break;
                    }
                }
            };

            let worker = thread::Builder::new()
                .name(format!("{name}-{index}"))
                .spawn(task_closure)?;

            channels.push(TaskChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                num_tasks_in_flight: 0,
                connected: true,
                _worker: worker,
            });
        }

        info!("Started {} '{}' worker(s)", num_workers, name);

        Ok(TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
        })
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was sent; the in-flight counter is incremented
    /// - `Err(task)` if the worker has disconnected, handing the task back
    fn try_send_task(&mut self, task: T, channel_idx: usize) -> Result<(), T> {
        let channel = &mut self.channels[channel_idx];
        match channel.task_sender.send(task) {
            Ok(_) => {
                channel.num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => {
                channel.connected = false;
                Err(task.0)
            }
        }
    }

    /// Finds an available worker channel that can accept a new task.
    ///
    /// Round-robin starting from the last used channel. Channels that have
    /// reached `MAX_TASKS_IN_FLIGHT`, or whose worker is gone, are skipped.
    fn find_available_channel(&self) -> Option<usize> {
        if self.channels.is_empty() {
            return None;
        }

        let start_channel = self.current_channel;
        let mut current = start_channel;

        loop {
            let channel = &self.channels[current];
            if channel.connected && channel.num_tasks_in_flight < MAX_TASKS_IN_FLIGHT {
                return Some(current);
            }
            current = (current + 1) % self.channels.len();
            if current == start_channel {
                return None;
            }
        }
    }

    /// Publishes a new task for execution.
    ///
    /// The task is sent to a free worker right away or queued if all workers are busy.
    ///
    /// # Returns
    /// - `true` if the task was immediately scheduled on a worker
    /// - `false` if the task was queued
    pub fn publish_task(&mut self, task: T) -> bool {
        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
                    self.queued_tasks.push_back(task);
                    false
                }
            },
            None => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Hands queued tasks to workers that have become available.
    ///
    /// Processes tasks in FIFO order and stops at the first task that can't
    /// be scheduled.
    pub fn process_queued_tasks(&mut self) {
        while !self.queued_tasks.is_empty() {
            let Some(channel_idx) = self.find_available_channel() else {
                break;
            };
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => self.queued_tasks.push_front(task),
            }
        }
    }

    /// Collects every outcome the workers have finished since the last call.
    ///
    /// Never blocks. Outcomes from one worker arrive in the order its tasks were sent.
    pub fn drain_completed(&mut self) -> Vec<TaskOutcome<T::Output>> {
        let mut outcomes = Vec::new();
        for channel in &mut self.channels {
            loop {
                match channel.result_receiver.try_recv() {
                    Ok(outcome) => {
                        channel.num_tasks_in_flight -= 1;
                        outcomes.push(outcome);
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        if channel.connected {
                            log::error!("Worker thread disconnected");
                        }
                        channel.connected = false;
                        break;
                    }
                }
            }
        }
        outcomes
    }

    /// Whether a newly published task would start immediately.
    pub fn has_available_worker(&self) -> bool {
        self.find_available_channel().is_some()
    }

    /// Whether any worker is still able to take work.
    pub fn has_connected_worker(&self) -> bool {
        self.channels.iter().any(|channel| channel.connected)
    }

    /// Number of tasks sent to workers and not yet collected.
    pub fn num_in_flight(&self) -> usize {
        self.channels
            .iter()
            .map(|channel| channel.num_tasks_in_flight)
            .sum()
    }

    pub fn num_queued(&self) -> usize {
        self.queued_tasks.len()
    }

    /// Whether there is no queued or in-flight work.
    pub fn is_idle(&self) -> bool {
        self.queued_tasks.is_empty() && self.num_in_flight() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    struct Square(u64);

    impl Task for Square {
        type Output = u64;

        fn process(self) -> u64 {
            if self.0 == 13 {
                panic!("unlucky");
            }
            self.0 * self.0
        }
    }

    fn drain_all(manager: &mut TaskManager<Square>, expected: usize) -> Vec<TaskOutcome<u64>> {
        let mut outcomes = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(10);
        while outcomes.len() < expected && Instant::now() < deadline {
            outcomes.extend(manager.drain_completed());
            manager.process_queued_tasks();
            std::thread::sleep(Duration::from_millis(1));
        }
        outcomes
    }

    #[test]
    fn single_worker_completes_in_fifo_order() {
        let mut manager = TaskManager::new(1, "square").unwrap();
        assert!(manager.publish_task(Square(2)));
        assert!(!manager.publish_task(Square(3)));
        assert!(!manager.publish_task(Square(4)));
        assert_eq!(manager.num_in_flight(), 1);
        assert_eq!(manager.num_queued(), 2);

        let outcomes = drain_all(&mut manager, 3);
        assert_eq!(outcomes, vec![Ok(4), Ok(9), Ok(16)]);
        assert!(manager.is_idle());
    }

    #[test]
    fn panicking_task_reports_and_worker_survives() {
        let mut manager = TaskManager::new(1, "square").unwrap();
        manager.publish_task(Square(13));
        manager.publish_task(Square(5));

        let outcomes = drain_all(&mut manager, 2);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(
            outcomes[0],
            Err(TaskPanic {
                message: "unlucky".to_string()
            })
        );
        assert_eq!(outcomes[1], Ok(25));
    }

    #[test]
    fn no_workers_queues_everything() {
        let mut manager = TaskManager::<Square>::new(0, "none").unwrap();
        assert!(!manager.publish_task(Square(1)));
        assert!(!manager.has_available_worker());
        assert_eq!(manager.num_queued(), 1);
    }
}
