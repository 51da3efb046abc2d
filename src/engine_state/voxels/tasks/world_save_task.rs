//! # World Save Task
//!
//! Writes the chunks edited since the last save without blocking the frame thread.

use std::sync::Arc;

use log::warn;

use crate::engine_state::persistence::SaveReport;
use crate::engine_state::task_management::task::{Task, TaskKind, TaskResult};
use crate::engine_state::voxels::world::World;

/// Writes every modified chunk in the background.
pub struct WorldSaveTask {
    world: Arc<World>,
}

impl WorldSaveTask {
    /// Creates a save task for `world`.
    pub fn new(world: Arc<World>) -> Self {
        WorldSaveTask { world }
    }
}

impl Task for WorldSaveTask {
    fn kind(&self) -> TaskKind {
        TaskKind::WorldSave
    }

    fn process(&self) -> Box<dyn TaskResult + Send> {
        Box::new(WorldSaveTaskResult {
            report: self.world.save_modified(),
        })
    }
}

/// The outcome of a background save.
pub struct WorldSaveTaskResult {
    report: SaveReport,
}

impl TaskResult for WorldSaveTaskResult {
    fn handle_result(self: Box<Self>, _world: &Arc<World>) -> Vec<Box<dyn Task + Send>> {
        if !self.report.is_complete() {
            warn!(
                "{} chunk(s) could not be saved and stay modified",
                self.report.failed.len()
            );
        }
        Vec::new()
    }
}
