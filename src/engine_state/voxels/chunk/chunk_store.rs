//! # Chunk Store
//!
//! The voxel map of one chunk: a fixed `width × height × width` array of
//! [`VoxelState`] values. All index arithmetic lives here. Callers address voxels by
//! chunk-local position and get back a [`VoxelLookup`] that says whether the voxel is
//! stored locally or has to be resolved through a neighbouring chunk.
//!
//! ## Memory Layout
//!
//! Voxels are stored x-fastest, then z, then y:
//! `index = x + width * (z + width * y)`. The persisted chunk record uses the same
//! order, so saving and loading copy the array front to back.

use cgmath::Point3;

use super::chunk_coord::ChunkCoord;
use super::chunk_iteration::ChunkVoxelIterator;
use crate::engine_state::voxels::block::{BlockId, AIR};

/// The state of a single voxel.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct VoxelState {
    /// Block type index into the catalog
    pub id: BlockId,
    /// Baked light level in [0, 1]
    pub light: f32,
}

impl VoxelState {
    /// A voxel of block `id` with no light.
    pub const fn new(id: BlockId) -> Self {
        VoxelState { id, light: 0.0 }
    }

    /// Fully lit air, used for voxels outside any chunk.
    pub const fn open_air() -> Self {
        VoxelState { id: AIR, light: 1.0 }
    }
}

/// Result of resolving a chunk-local position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum VoxelLookup<'a> {
    /// The voxel lives in this chunk.
    Local(&'a VoxelState),
    /// The voxel lives in a horizontally adjacent chunk, at this world position.
    Neighbor(Point3<i32>),
    /// Above or below the world column; there is nothing there.
    OutOfWorld,
}

/// Fixed-size voxel map for one chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkStore {
    coord: ChunkCoord,
    width: usize,
    height: usize,
    voxels: Vec<VoxelState>,
}

impl ChunkStore {
    /// Allocates a chunk full of unlit air.
    pub fn new(coord: ChunkCoord, width: usize, height: usize) -> Self {
        ChunkStore {
            coord,
            width,
            height,
            voxels: vec![VoxelState::default(); width * width * height],
        }
    }

    /// Wraps an existing voxel array.
    ///
    /// # Returns
    /// `None` if `voxels` does not hold exactly `width * width * height` entries.
    pub fn from_voxels(
        coord: ChunkCoord,
        width: usize,
        height: usize,
        voxels: Vec<VoxelState>,
    ) -> Option<Self> {
        if voxels.len() != width * width * height {
            return None;
        }
        Some(ChunkStore {
            coord,
            width,
            height,
            voxels,
        })
    }

    /// The chunk this store belongs to.
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Horizontal edge length in voxels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Vertical size in voxels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of voxels.
    pub fn volume(&self) -> usize {
        self.voxels.len()
    }

    /// The raw voxel array in storage order.
    pub fn voxels(&self) -> &[VoxelState] {
        &self.voxels
    }

    /// Mutable access to the raw voxel array in storage order.
    pub fn voxels_mut(&mut self) -> &mut [VoxelState] {
        &mut self.voxels
    }

    /// Iterates every voxel with its local position, in storage order.
    pub fn iter(&self) -> ChunkVoxelIterator<'_> {
        ChunkVoxelIterator::new(self)
    }

    /// Storage index of an in-bounds local position.
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.width * (z + self.width * y)
    }

    /// Inverse of [`ChunkStore::index`].
    #[inline]
    pub fn position_of(&self, index: usize) -> Point3<usize> {
        let plane = self.width * self.width;
        let y = index / plane;
        let rest = index % plane;
        Point3::new(rest % self.width, y, rest / self.width)
    }

    /// Returns true if the local position is inside this chunk.
    #[inline]
    pub fn contains(&self, local: Point3<i32>) -> bool {
        local.x >= 0
            && local.y >= 0
            && local.z >= 0
            && (local.x as usize) < self.width
            && (local.y as usize) < self.height
            && (local.z as usize) < self.width
    }

    /// Resolves a chunk-local position, which may lie outside this chunk.
    pub fn lookup(&self, local: Point3<i32>) -> VoxelLookup<'_> {
        if local.y < 0 || local.y as usize >= self.height {
            return VoxelLookup::OutOfWorld;
        }
        if !self.contains(local) {
            return VoxelLookup::Neighbor(self.local_to_world(local));
        }
        let index = self.index(local.x as usize, local.y as usize, local.z as usize);
        VoxelLookup::Local(&self.voxels[index])
    }

    /// The voxel at an in-bounds local position.
    pub fn get(&self, local: Point3<i32>) -> Option<&VoxelState> {
        if !self.contains(local) {
            return None;
        }
        let index = self.index(local.x as usize, local.y as usize, local.z as usize);
        self.voxels.get(index)
    }

    /// Mutable access to the voxel at an in-bounds local position.
    pub fn get_mut(&mut self, local: Point3<i32>) -> Option<&mut VoxelState> {
        if !self.contains(local) {
            return None;
        }
        let index = self.index(local.x as usize, local.y as usize, local.z as usize);
        self.voxels.get_mut(index)
    }

    /// Sets the block id at a local position.
    ///
    /// # Returns
    /// `true` if the stored id changed; out-of-bounds writes are ignored.
    pub fn set_id(&mut self, local: Point3<i32>, id: BlockId) -> bool {
        match self.get_mut(local) {
            Some(voxel) if voxel.id != id => {
                voxel.id = id;
                true
            }
            _ => false,
        }
    }

    /// World position of this chunk's local (0, 0, 0).
    pub fn world_origin(&self) -> Point3<i32> {
        self.coord.world_origin(self.width)
    }

    /// Converts a chunk-local position to a world position.
    pub fn local_to_world(&self, local: Point3<i32>) -> Point3<i32> {
        let origin = self.world_origin();
        Point3::new(origin.x + local.x, local.y, origin.z + local.z)
    }

    /// Converts a world position to a chunk-local position, which may be out of bounds.
    pub fn world_to_local(&self, world: Point3<i32>) -> Point3<i32> {
        let origin = self.world_origin();
        Point3::new(world.x - origin.x, world.y, world.z - origin.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::STONE;

    #[test]
    fn index_and_position_are_inverse() {
        let store = ChunkStore::new(ChunkCoord::new(0, 0), 4, 6);
        for index in 0..store.volume() {
            let position = store.position_of(index);
            assert_eq!(store.index(position.x, position.y, position.z), index);
        }
        assert_eq!(store.index(1, 0, 0), 1);
        assert_eq!(store.index(0, 0, 1), 4);
        assert_eq!(store.index(0, 1, 0), 16);
    }

    #[test]
    fn lookup_redirects_outside_the_chunk() {
        let store = ChunkStore::new(ChunkCoord::new(2, 3), 4, 6);

        assert!(matches!(
            store.lookup(Point3::new(0, 0, 0)),
            VoxelLookup::Local(_)
        ));
        assert_eq!(
            store.lookup(Point3::new(-1, 2, 0)),
            VoxelLookup::Neighbor(Point3::new(7, 2, 12))
        );
        assert_eq!(
            store.lookup(Point3::new(1, 2, 4)),
            VoxelLookup::Neighbor(Point3::new(9, 2, 16))
        );
        assert_eq!(store.lookup(Point3::new(0, 6, 0)), VoxelLookup::OutOfWorld);
        assert_eq!(store.lookup(Point3::new(0, -1, 0)), VoxelLookup::OutOfWorld);
    }

    #[test]
    fn set_id_reports_changes_only() {
        let mut store = ChunkStore::new(ChunkCoord::new(0, 0), 4, 6);
        let position = Point3::new(1, 2, 3);

        assert!(store.set_id(position, STONE));
        assert!(!store.set_id(position, STONE));
        assert!(!store.set_id(Point3::new(4, 0, 0), STONE));
        assert_eq!(store.get(position).map(|voxel| voxel.id), Some(STONE));
    }

    #[test]
    fn from_voxels_checks_the_length() {
        let coord = ChunkCoord::new(0, 0);
        assert!(ChunkStore::from_voxels(coord, 2, 2, vec![VoxelState::default(); 8]).is_some());
        assert!(ChunkStore::from_voxels(coord, 2, 2, vec![VoxelState::default(); 7]).is_none());
    }
}
