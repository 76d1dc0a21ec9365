//! # Task System Core Traits
//!
//! This module defines the fundamental building blocks of the task system,
//! which provides a framework for executing work asynchronously across multiple threads.
//!
//! ## Core Components
//! - `Task`: Represents a unit of work that can be executed asynchronously
//! - `TaskResult`: Represents the result of a completed task
//! - `TaskContext`: The engine state a result may touch on the main thread
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the main thread
//! 5. The result can update the world, upload geometry, or spawn new tasks
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred between threads
//! - `TaskResult` must be `Send` to be transferred back to the main thread
//! - Geometry is only ever uploaded or released from `handle_result()`

use crate::engine_state::{geometry_state::SharedGeometryStore, voxels::world::World};

/// Main-thread state handed to every task result.
pub struct TaskContext<'a> {
    /// The world chunks are added to and looked up in
    pub world: &'a mut World,
    /// The store chunk geometry is uploaded to
    pub geometry_store: &'a SharedGeometryStore,
}

/// A trait representing a unit of work that can be executed asynchronously.
///
/// Tasks should own (or share through [`MtResource`](crate::MtResource)) all the data
/// they need, since they run on a background thread.
pub trait Task: Send {
    /// Processes the task and returns a result.
    ///
    /// This runs on a background thread. Errors are carried inside the returned result
    /// rather than panicking the worker.
    fn process(&self) -> Box<dyn TaskResult>;
}

/// A trait representing the result of processing a `Task`.
///
/// Results are handled on the main thread, in the order their workers delivered them.
pub trait TaskResult: Send {
    /// Applies the result to the engine.
    ///
    /// # Returns
    /// Follow-up tasks to schedule (can be empty).
    fn handle_result(self: Box<Self>, context: &mut TaskContext<'_>) -> Vec<Box<dyn Task>>;
}
