//! Deferred voxel edits and the batches they travel in.

use cgmath::Point3;

use super::block::BlockId;

/// A deferred single-voxel mutation, applied once by the chunk that owns `position`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VoxelMod {
    /// World position of the voxel to change
    pub position: Point3<i32>,
    /// Block id to write
    pub id: BlockId,
}

impl VoxelMod {
    /// Creates a modification writing `id` at `position`.
    pub fn new(position: Point3<i32>, id: BlockId) -> Self {
        VoxelMod { position, id }
    }
}

/// Who produced a batch of modifications.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ModSource {
    /// Terrain structures such as trees and cacti
    Structure,
    /// An explicit edit through the world's edit entry point
    Player,
}

/// Modifications that were produced together and are applied together.
#[derive(Clone, Debug, PartialEq)]
pub struct ModificationBatch {
    /// Producer of the batch
    pub source: ModSource,
    /// The individual voxel writes, in order
    pub mods: Vec<VoxelMod>,
}

impl ModificationBatch {
    /// A batch generated by a terrain structure.
    pub fn structure(mods: Vec<VoxelMod>) -> Self {
        ModificationBatch {
            source: ModSource::Structure,
            mods,
        }
    }

    /// A batch holding a single explicit edit.
    pub fn player(modification: VoxelMod) -> Self {
        ModificationBatch {
            source: ModSource::Player,
            mods: vec![modification],
        }
    }

    /// Explicit edits jump the mesh queue; structures wait their turn.
    pub fn is_priority(&self) -> bool {
        self.source == ModSource::Player
    }
}
