//! # Chunk Population Task
//!
//! This module defines the `ChunkPopulationTask`, which fills an unallocated chunk's
//! voxel store. It is scheduled when a chunk enters view distance, or when a
//! structure reaches into a chunk close to the viewer.

use std::sync::Arc;

use log::debug;

use crate::engine_state::task_management::task::{Task, TaskKind, TaskResult};
use crate::engine_state::voxels::chunk::{ChunkCoord, ChunkState};
use crate::engine_state::voxels::voxel_mod::{ModificationBatch, VoxelMod};
use crate::engine_state::voxels::world::{ChunkSource, World};

/// A task that loads or generates one chunk's voxels.
///
/// This task is responsible for:
/// 1. Moving the chunk from `Unallocated` to `Populating`
/// 2. Fetching its voxels from memory, disk or the terrain sampler
/// 3. Handing the structures that grew in it back as modifications
pub struct ChunkPopulationTask {
    world: Arc<World>,
    coord: ChunkCoord,
}

impl ChunkPopulationTask {
    /// Creates a new population task.
    ///
    /// # Arguments
    /// * `world` - The world the chunk belongs to
    /// * `coord` - The chunk to populate; it should already be allocated
    pub fn new(world: Arc<World>, coord: ChunkCoord) -> Self {
        ChunkPopulationTask { world, coord }
    }
}

impl Task for ChunkPopulationTask {
    fn kind(&self) -> TaskKind {
        TaskKind::ChunkPopulation
    }

    fn process(&self) -> Box<dyn TaskResult + Send> {
        let claimed = self.world.chunk(self.coord).is_some_and(|chunk| {
            chunk.transition(ChunkState::Unallocated, ChunkState::Populating)
        });
        if !claimed {
            return Box::new(ChunkPopulationTaskResult {
                coord: self.coord,
                populated: None,
            });
        }

        let populated = self.world.request_chunk_data(self.coord);
        debug!("Chunk {} populated from {:?}", self.coord, populated.source);
        if let Some(chunk) = self.world.chunk(self.coord) {
            chunk.set_data(populated.data);
        }

        Box::new(ChunkPopulationTaskResult {
            coord: self.coord,
            populated: Some((populated.source, populated.structures)),
        })
    }
}

/// The result of a population task.
pub struct ChunkPopulationTaskResult {
    coord: ChunkCoord,
    /// Source and grown structures, or `None` if the chunk was not claimed
    populated: Option<(ChunkSource, Vec<Vec<VoxelMod>>)>,
}

impl TaskResult for ChunkPopulationTaskResult {
    /// Makes the chunk editable and queues its first mesh build.
    ///
    /// Chunks loaded from disk may differ from what neighbours sampled across the
    /// shared edge, so editable neighbours are queued for a rebuild too.
    fn handle_result(self: Box<Self>, world: &Arc<World>) -> Vec<Box<dyn Task + Send>> {
        let Some((source, structures)) = self.populated else {
            return Vec::new();
        };
        let Some(chunk) = world.chunk(self.coord) else {
            return Vec::new();
        };

        chunk.transition(ChunkState::Populating, ChunkState::Idle);
        world.queue_mesh(self.coord, false);

        for structure in structures {
            world.modifications.push_back(ModificationBatch::structure(structure));
        }

        if source == ChunkSource::Disk {
            for neighbor in self.coord.neighbors() {
                if world.editable_chunk_data(neighbor).is_some() {
                    world.queue_mesh(neighbor, false);
                }
            }
        }

        Vec::new()
    }
}
