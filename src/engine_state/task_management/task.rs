//! # Task System Core Traits
//!
//! This module defines the building blocks of the task system.
//!
//! ## Core Components
//! - `Task`: A unit of work executed on a worker thread
//! - `TaskResult`: The outcome of a task, handled back on the frame thread
//! - `TaskKind`: Which family a task belongs to, used for per-kind bookkeeping
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the frame thread
//! 5. The result can spawn follow-up tasks
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred between threads
//! - `TaskResult` must be `Send` to be transferred back to the frame thread
//! - Tasks reach shared state through the `World` they were built with

use std::sync::Arc;

use crate::engine_state::voxels::world::World;

/// The families of background work.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Loading or generating a chunk's voxels
    ChunkPopulation,
    /// Routing queued voxel modifications to their chunks
    Modification,
    /// Applying a chunk's parked edits, relighting and meshing it
    ChunkMesh,
    /// Writing modified chunks to disk
    WorldSave,
}

impl TaskKind {
    /// Every kind, in a fixed order.
    pub const ALL: [TaskKind; 4] = [
        TaskKind::ChunkPopulation,
        TaskKind::Modification,
        TaskKind::ChunkMesh,
        TaskKind::WorldSave,
    ];

    pub(crate) fn slot(self) -> usize {
        self as usize
    }
}

/// A unit of work that can be executed on a worker thread.
///
/// Tasks should own everything they need (usually an `Arc<World>` and a chunk
/// coordinate) so they can be moved to any worker.
pub trait Task: Send {
    /// The family this task belongs to.
    fn kind(&self) -> TaskKind;

    /// Performs the work and returns a result.
    ///
    /// # Implementation Notes
    /// - Runs on a worker thread, or inline when threading is disabled
    /// - Should handle errors internally and log them
    ///
    /// # Returns
    /// A boxed `TaskResult` that will be processed on the frame thread.
    fn process(&self) -> Box<dyn TaskResult + Send>;
}

/// The result of processing a `Task`.
///
/// Results are handled on the frame thread, in the order they are received, and may
/// update world bookkeeping that only the frame thread touches.
pub trait TaskResult: Send {
    /// Handles the result on the frame thread.
    ///
    /// # Arguments
    /// * `world` - The world the task ran against
    ///
    /// # Returns
    /// Follow-up tasks to publish (can be empty).
    fn handle_result(self: Box<Self>, world: &Arc<World>) -> Vec<Box<dyn Task + Send>>;
}
