//! # Modification Task
//!
//! Routes queued voxel modifications to the chunks that own them. The writes
//! themselves happen later, in the owning chunk's next mesh build, so a chunk's store
//! is only ever mutated by the one task that holds it in `Meshing`.

use std::sync::Arc;

use log::debug;

use crate::engine_state::task_management::task::{Task, TaskKind, TaskResult};
use crate::engine_state::voxels::chunk::{ChunkCoord, ChunkState};
use crate::engine_state::voxels::world::World;

use super::chunk_population_task::ChunkPopulationTask;

/// Drains the world's modification queue and parks every modification on its chunk.
pub struct ModificationTask {
    world: Arc<World>,
}

impl ModificationTask {
    /// Creates a task that drains `world`'s modification queue.
    pub fn new(world: Arc<World>) -> Self {
        ModificationTask { world }
    }
}

impl Task for ModificationTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Modification
    }

    fn process(&self) -> Box<dyn TaskResult + Send> {
        let dimensions = self.world.dimensions();
        let mut touched: Vec<(ChunkCoord, bool)> = Vec::new();
        let mut dropped = 0;

        for batch in self.world.modifications.drain_all() {
            let priority = batch.is_priority();
            for modification in batch.mods {
                if !dimensions.contains_voxel(modification.position) {
                    dropped += 1;
                    continue;
                }
                let owner = ChunkCoord::from_voxel(modification.position, dimensions.chunk_width);
                let Some(chunk) = self.world.chunk_or_allocate(owner) else {
                    dropped += 1;
                    continue;
                };
                chunk.queue_modification(modification);

                match touched.iter_mut().find(|(coord, _)| *coord == owner) {
                    Some(entry) => entry.1 |= priority,
                    None => touched.push((owner, priority)),
                }
            }
        }

        if dropped > 0 {
            debug!("Dropped {dropped} modification(s) outside the world");
        }
        Box::new(ModificationTaskResult { touched })
    }
}

/// Chunks that received modifications, and whether any came from an explicit edit.
pub struct ModificationTaskResult {
    touched: Vec<(ChunkCoord, bool)>,
}

impl TaskResult for ModificationTaskResult {
    /// Queues editable chunks for a rebuild and starts population of unallocated
    /// chunks close enough to the viewer.
    fn handle_result(self: Box<Self>, world: &Arc<World>) -> Vec<Box<dyn Task + Send>> {
        let load_distance = world.settings().load_distance;
        let mut tasks: Vec<Box<dyn Task + Send>> = Vec::new();

        for (coord, priority) in self.touched {
            let Some(chunk) = world.chunk(coord) else {
                continue;
            };
            if chunk.is_editable() {
                world.queue_mesh(coord, priority);
            } else if chunk.state() == ChunkState::Unallocated
                && world.is_near_viewer(coord, load_distance)
                && chunk.mark_creation_queued()
            {
                tasks.push(Box::new(ChunkPopulationTask::new(world.clone(), coord)));
            }
        }

        tasks
    }
}
