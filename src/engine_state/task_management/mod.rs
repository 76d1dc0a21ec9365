//! # Task Management System
//!
//! This module provides a task management system for executing work on a pool of
//! background threads while keeping every side effect on the main thread.
//!
//! ## Architecture Overview
//!
//! The task management system consists of several key components:
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that can be executed asynchronously
//! - `TaskResult`: The result of a completed task, which can spawn additional tasks
//! - `TaskChannel`: Communication channel between the main thread and worker threads
//!
//! ## Task Lifecycle
//! 1. Tasks are created and published via `TaskManager::publish_task()`
//! 2. The manager distributes tasks to available worker channels using round-robin
//! 3. Workers process tasks asynchronously and return results
//! 4. Results are processed on the main thread in `process_completed_tasks()`
//! 5. Results can spawn new tasks, which are published in turn
//!
//! ## Example Usage
//! ```rust,ignore
//! let mut task_manager = TaskManager::new(num_workers);
//!
//! // Publish a task for background processing
//! task_manager.publish_task(Box::new(MyTask::new(...)));
//!
//! // In your main/game loop:
//! task_manager.process_completed_tasks(&mut context);
//! task_manager.process_queued_tasks();
//! ```

pub mod task;

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use log::{debug, error, info, warn};
use task::{Task, TaskContext, TaskResult};

/// A communication channel between the main thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from main thread to worker
/// - `result_receiver`: Receives task results from worker
/// - `num_tasks_in_flight`: Tracks number of tasks currently being processed
/// - `worker`: Handle to the worker thread, joined on shutdown
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task>>,
    result_receiver: Receiver<Box<dyn TaskResult>>,
    num_tasks_in_flight: usize,
    disconnected: bool,
    worker: Option<JoinHandle<()>>,
}

impl TaskChannel {
    fn is_available(&self) -> bool {
        !self.disconnected && self.num_tasks_in_flight < MAX_TASKS_IN_FLIGHT
    }
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// The `TaskManager` is responsible for:
/// - Creating and managing worker threads
/// - Distributing tasks across available workers
/// - Collecting and processing task results
/// - Handling task queuing when all workers are busy
///
/// Dropping the manager closes every channel and joins the workers.
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task>>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// This is set to 1 so a busy worker never holds a backlog that an idle worker could
/// have taken.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// A worker that fails to start is logged and left out of the pool.
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        info!(
            "Starting {} task workers (available parallelism: {:?})",
            num_workers,
            thread::available_parallelism()
        );

        for worker_index in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task>>();
            let (result_tx, result_rx) = channel::<Box<dyn TaskResult>>();

            let task_closure = move || {
                while let Ok(task) = task_rx.recv() {
                    let result = task.process();
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            };

            let worker = match thread::Builder::new()
                .name(format!("task-worker-{}", worker_index))
                .spawn(task_closure)
            {
                Ok(worker) => worker,
                Err(e) => {
                    error!("Failed to start task worker {}: {}", worker_index, e);
                    continue;
                }
            };

            channels.push(TaskChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                num_tasks_in_flight: 0,
                disconnected: false,
                worker: Some(worker),
            });
        }

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
        }
    }

    /// Number of worker threads in the pool.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of tasks queued or running.
    pub fn pending_tasks(&self) -> usize {
        self.queued_tasks.len()
            + self
                .channels
                .iter()
                .map(|channel| channel.num_tasks_in_flight)
                .sum::<usize>()
    }

    /// Returns `true` if no task is queued or running.
    pub fn is_idle(&self) -> bool {
        self.pending_tasks() == 0
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was successfully sent to the worker
    /// - `Err(task)` if the worker has disconnected; the channel is marked dead
    fn try_send_task(
        &mut self,
        task: Box<dyn Task>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task>> {
        let channel = &mut self.channels[channel_idx];
        match channel.task_sender.send(task) {
            Ok(_) => {
                channel.num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => {
                warn!("Task worker {} has disconnected", channel_idx);
                channel.disconnected = true;
                Err(task.0)
            }
        }
    }

    /// Finds an available worker channel that can accept a new task.
    ///
    /// This implements a round-robin scheduling strategy starting from the last
    /// used channel to ensure even distribution of tasks across all workers.
    fn find_available_channel(&self) -> Option<usize> {
        let count = self.channels.len();
        (0..count)
            .map(|offset| (self.current_channel + offset) % count)
            .find(|&idx| self.channels[idx].is_available())
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was immediately scheduled on an available worker
    /// - `false` if the task was queued because all workers are busy
    pub fn publish_task(&mut self, task: Box<dyn Task>) -> bool {
        let mut task = task;
        while let Some(channel_idx) = self.find_available_channel() {
            match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    return true;
                }
                Err(returned) => task = returned,
            }
        }

        self.queued_tasks.push_back(task);
        false
    }

    /// Processes any queued tasks if workers are available.
    ///
    /// Tasks are scheduled in FIFO order until the queue is empty or all workers are busy.
    pub fn process_queued_tasks(&mut self) {
        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                return;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => self.queued_tasks.push_front(task),
            }
        }
    }

    /// Processes all completed task results from worker threads.
    ///
    /// Must be called on the main thread. Results are handled in the order they were
    /// received; any follow-up tasks they return are published afterwards.
    pub fn process_completed_tasks(&mut self, context: &mut TaskContext<'_>) {
        let mut tasks_to_queue = Vec::new();

        for (idx, channel) in self.channels.iter_mut().enumerate() {
            loop {
                match channel.result_receiver.try_recv() {
                    Ok(result) => {
                        channel.num_tasks_in_flight -= 1;
                        tasks_to_queue.extend(result.handle_result(context));
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        Self::mark_disconnected(idx, channel);
                        break;
                    }
                }
            }
        }

        for task in tasks_to_queue {
            self.publish_task(task);
        }
    }

    /// Blocks until every queued, running and follow-up task has been handled.
    ///
    /// Gives up (leaving tasks queued) only if every worker has disconnected.
    pub fn wait_for_all(&mut self, context: &mut TaskContext<'_>) {
        loop {
            self.process_queued_tasks();
            if self.is_idle() {
                return;
            }
            if self.channels.iter().all(|channel| channel.disconnected) {
                error!(
                    "All task workers have disconnected, {} tasks left unprocessed",
                    self.queued_tasks.len()
                );
                return;
            }

            let mut tasks_to_queue = Vec::new();
            for (idx, channel) in self.channels.iter_mut().enumerate() {
                if channel.num_tasks_in_flight == 0 {
                    continue;
                }
                match channel.result_receiver.recv() {
                    Ok(result) => {
                        channel.num_tasks_in_flight -= 1;
                        tasks_to_queue.extend(result.handle_result(context));
                    }
                    Err(_) => Self::mark_disconnected(idx, channel),
                }
            }

            for task in tasks_to_queue {
                self.publish_task(task);
            }
        }
    }

    fn mark_disconnected(idx: usize, channel: &mut TaskChannel) {
        if !channel.disconnected {
            error!(
                "Task worker {} stopped with {} tasks in flight",
                idx, channel.num_tasks_in_flight
            );
        }
        channel.disconnected = true;
        channel.num_tasks_in_flight = 0;
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        let workers: Vec<_> = self
            .channels
            .drain(..)
            .filter_map(|channel| channel.worker)
            .collect();

        for worker in workers {
            if worker.join().is_err() {
                warn!("A task worker panicked before shutdown");
            }
        }
        debug!("Task workers stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::engine_state::geometry_state::{CpuGeometryStore, SharedGeometryStore};
    use crate::engine_state::voxels::{generation::UniformGenerator, world::World};

    struct CountTask {
        remaining_follow_ups: usize,
        handled: Arc<AtomicUsize>,
    }

    struct CountResult {
        remaining_follow_ups: usize,
        handled: Arc<AtomicUsize>,
    }

    impl Task for CountTask {
        fn process(&self) -> Box<dyn TaskResult> {
            Box::new(CountResult {
                remaining_follow_ups: self.remaining_follow_ups,
                handled: self.handled.clone(),
            })
        }
    }

    impl TaskResult for CountResult {
        fn handle_result(self: Box<Self>, _context: &mut TaskContext<'_>) -> Vec<Box<dyn Task>> {
            self.handled.fetch_add(1, Ordering::SeqCst);
            if self.remaining_follow_ups == 0 {
                return Vec::new();
            }
            vec![Box::new(CountTask {
                remaining_follow_ups: self.remaining_follow_ups - 1,
                handled: self.handled.clone(),
            })]
        }
    }

    #[test]
    fn all_tasks_and_follow_ups_are_handled() {
        let mut world = World::new(Arc::new(UniformGenerator::new(0)));
        let store: SharedGeometryStore = Arc::new(CpuGeometryStore::new());
        let mut context = TaskContext {
            world: &mut world,
            geometry_store: &store,
        };

        let handled = Arc::new(AtomicUsize::new(0));
        let mut manager = TaskManager::new(2);
        assert_eq!(manager.worker_count(), 2);

        for _ in 0..5 {
            manager.publish_task(Box::new(CountTask {
                remaining_follow_ups: 2,
                handled: handled.clone(),
            }));
        }
        assert_eq!(manager.pending_tasks(), 5);

        manager.wait_for_all(&mut context);
        assert!(manager.is_idle());
        assert_eq!(handled.load(Ordering::SeqCst), 15);
    }

    #[test]
    fn without_workers_tasks_stay_queued() {
        let mut manager = TaskManager::new(0);
        let handled = Arc::new(AtomicUsize::new(0));
        assert!(!manager.publish_task(Box::new(CountTask {
            remaining_follow_ups: 0,
            handled,
        })));
        manager.process_queued_tasks();
        assert_eq!(manager.pending_tasks(), 1);
    }
}
