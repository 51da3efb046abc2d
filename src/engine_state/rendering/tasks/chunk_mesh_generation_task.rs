//! Task for building a chunk's mesh in a background thread.
//!
//! This module contains the `ChunkMeshGenerationTask`, the only place a populated
//! chunk's voxels are written. One build:
//!
//! 1. Captures the neighbours' edge layers, before touching its own lock
//! 2. Applies the modifications parked on the chunk
//! 3. Relights the chunk
//! 4. Builds the mesh
//!
//! The chunk sits in `Meshing` for the whole build, so edits that arrive meanwhile
//! stay parked until the next pass.

use std::sync::Arc;

use log::debug;
use web_time::Instant;

use crate::engine_state::rendering::meshing::light::recalculate_light;
use crate::engine_state::rendering::meshing::{build_chunk_mesh, ChunkMesh, NeighborSnapshot};
use crate::engine_state::task_management::task::{Task, TaskKind, TaskResult};
use crate::engine_state::voxels::chunk::{ChunkCoord, ChunkState};
use crate::engine_state::voxels::world::World;

/// A task that applies a chunk's parked edits and rebuilds its mesh.
pub struct ChunkMeshGenerationTask {
    /// The world the chunk belongs to
    world: Arc<World>,
    /// The chunk to build; it must already be in `Meshing`
    coord: ChunkCoord,
}

impl ChunkMeshGenerationTask {
    /// Creates a new chunk mesh generation task.
    ///
    /// # Arguments
    /// * `world` - The world the chunk belongs to
    /// * `coord` - A chunk claimed with `Chunk::try_begin_meshing`
    pub fn new(world: Arc<World>, coord: ChunkCoord) -> Self {
        ChunkMeshGenerationTask { world, coord }
    }
}

impl Task for ChunkMeshGenerationTask {
    fn kind(&self) -> TaskKind {
        TaskKind::ChunkMesh
    }

    /// Builds the mesh.
    ///
    /// # Returns
    /// The mesh plus the neighbours whose shared edge was edited. A chunk without
    /// voxel data yields no mesh.
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let start = Instant::now();
        let chunk_and_data = self
            .world
            .chunk(self.coord)
            .and_then(|chunk| chunk.data().cloned().map(|data| (chunk, data)));
        let Some((chunk, data)) = chunk_and_data else {
            return Box::new(ChunkMeshGenerationTaskResult {
                coord: self.coord,
                mesh: None,
                edited_neighbors: Vec::new(),
            });
        };

        let snapshot = NeighborSnapshot::capture(&self.world, self.coord);
        let modifications = chunk.take_pending_modifications();
        let width = self.world.dimensions().chunk_width as i32;
        let mut edited_neighbors = Vec::new();
        let mut changed = 0;

        let mesh = {
            let mut store = data.map.get_mut();
            for modification in &modifications {
                let local = store.world_to_local(modification.position);
                if !store.set_id(local, modification.id) {
                    continue;
                }
                changed += 1;

                let mut touch = |dx: i32, dz: i32| {
                    let neighbor = self.coord.offset(dx, dz);
                    if !edited_neighbors.contains(&neighbor) {
                        edited_neighbors.push(neighbor);
                    }
                };
                if local.x == 0 {
                    touch(-1, 0);
                }
                if local.x == width - 1 {
                    touch(1, 0);
                }
                if local.z == 0 {
                    touch(0, -1);
                }
                if local.z == width - 1 {
                    touch(0, 1);
                }
            }

            recalculate_light(
                &mut store,
                self.world.catalog(),
                self.world.settings().light_falloff,
            );
            build_chunk_mesh(&store, self.world.catalog(), &snapshot, self.world.atlas())
        };

        if changed > 0 {
            self.world.mark_modified(self.coord);
        }

        debug!(
            "Meshed chunk {} in {:?}: {} quads, {} of {} edit(s) changed voxels",
            self.coord,
            start.elapsed(),
            mesh.quad_count(),
            changed,
            modifications.len()
        );

        Box::new(ChunkMeshGenerationTaskResult {
            coord: self.coord,
            mesh: Some(Arc::new(mesh)),
            edited_neighbors,
        })
    }
}

/// The result of a chunk mesh generation task.
pub struct ChunkMeshGenerationTaskResult {
    coord: ChunkCoord,
    mesh: Option<Arc<ChunkMesh>>,
    /// Neighbours whose faces against this chunk may have changed
    edited_neighbors: Vec<ChunkCoord>,
}

impl TaskResult for ChunkMeshGenerationTaskResult {
    /// Publishes the mesh to the draw queue and returns the chunk to `Idle`.
    fn handle_result(self: Box<Self>, world: &Arc<World>) -> Vec<Box<dyn Task + Send>> {
        let Some(chunk) = world.chunk(self.coord) else {
            return Vec::new();
        };

        if let Some(mesh) = self.mesh {
            chunk.set_mesh(mesh.clone());
            world.draw_queue.push_back(mesh);
        }
        chunk.transition(ChunkState::Meshing, ChunkState::Idle);

        for neighbor in self.edited_neighbors {
            if world.editable_chunk_data(neighbor).is_some() {
                world.queue_mesh(neighbor, true);
            }
        }

        Vec::new()
    }
}
