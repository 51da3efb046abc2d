//! # Voxel World
//!
//! This module contains the voxel world proper: the data that describes it and the
//! orchestration that keeps it loaded, generated and meshed around a viewer.
//!
//! ## Architecture
//!
//! * **Block**: the static block catalog and the six-face table
//! * **Chunk**: fixed-size voxel stores and the per-chunk lifecycle state machine
//! * **Generation**: the deterministic terrain sampler and structure generation
//! * **World**: the orchestrator owning chunks, work queues and collaborators
//! * **Tasks**: background work (population, modification, saving)
//!
//! ## Data Flow
//!
//! 1. The frame driver asks the world for the chunks around the viewer
//! 2. Population tasks fill new chunks from memory, disk or the sampler
//! 3. Structures and edits flow through the modification queue to their chunks
//! 4. Mesh tasks apply parked edits, relight and mesh editable chunks
//! 5. Finished meshes wait in the draw queue for the renderer
//!
//! ## Thread Safety
//!
//! * A chunk's voxel store is only written by the single mesh build that owns it
//! * Work lists are mutex-guarded queues shared with the workers
//! * Cross-chunk reads copy a snapshot instead of holding two locks

use cgmath::Point3;

use chunk::ChunkCoord;

pub mod block;
pub mod chunk;
pub mod generation;
pub mod tasks;
pub mod voxel_mod;
pub mod world;

/// Chunk and world sizes, copied into every component that does index arithmetic.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WorldDimensions {
    /// Horizontal chunk edge in voxels
    pub chunk_width: usize,
    /// Chunk height in voxels, also the world height
    pub chunk_height: usize,
    /// World edge in chunks
    pub world_size_in_chunks: usize,
}

impl WorldDimensions {
    /// World edge in voxels.
    pub fn world_size_in_voxels(&self) -> i32 {
        (self.world_size_in_chunks * self.chunk_width) as i32
    }

    /// World position at the horizontal centre of the world.
    pub fn world_center(&self) -> i32 {
        self.world_size_in_voxels() / 2
    }

    /// Voxels in one chunk.
    pub fn chunk_volume(&self) -> usize {
        self.chunk_width * self.chunk_width * self.chunk_height
    }

    /// Returns true if the world position lies inside the finite world.
    pub fn contains_voxel(&self, position: Point3<i32>) -> bool {
        let size = self.world_size_in_voxels();
        position.x >= 0
            && position.x < size
            && position.y >= 0
            && position.y < self.chunk_height as i32
            && position.z >= 0
            && position.z < size
    }

    /// Returns true if the chunk lies inside the finite world.
    pub fn contains_chunk(&self, coord: ChunkCoord) -> bool {
        let size = self.world_size_in_chunks as i32;
        coord.x >= 0 && coord.x < size && coord.z >= 0 && coord.z < size
    }
}
