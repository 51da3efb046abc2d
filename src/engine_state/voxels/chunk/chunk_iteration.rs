//! # Chunk Iteration Module
//!
//! This module provides an iterator over every voxel of a chunk store together with
//! its local position. Iteration follows storage order (x fastest, then z, then y), so
//! walking the store touches memory front to back.

use cgmath::Point3;

use super::chunk_store::{ChunkStore, VoxelState};

/// An iterator over all voxels of a [`ChunkStore`].
///
/// The local position is tracked incrementally instead of being recomputed from the
/// storage index on every step.
pub struct ChunkVoxelIterator<'a> {
    /// The store being iterated over
    store: &'a ChunkStore,
    /// Next storage index
    index: usize,
    /// Current X position within the chunk
    local_x: usize,
    /// Current Y position within the chunk
    local_y: usize,
    /// Current Z position within the chunk
    local_z: usize,
}

impl<'a> ChunkVoxelIterator<'a> {
    /// Creates an iterator positioned at local (0, 0, 0).
    pub fn new(store: &'a ChunkStore) -> Self {
        ChunkVoxelIterator {
            store,
            index: 0,
            local_x: 0,
            local_y: 0,
            local_z: 0,
        }
    }
}

impl<'a> Iterator for ChunkVoxelIterator<'a> {
    type Item = (Point3<usize>, &'a VoxelState);

    fn next(&mut self) -> Option<Self::Item> {
        let voxel = self.store.voxels().get(self.index)?;
        let position = Point3::new(self.local_x, self.local_y, self.local_z);

        self.index += 1;
        self.local_x += 1;
        if self.local_x == self.store.width() {
            self.local_x = 0;
            self.local_z += 1;
            if self.local_z == self.store.width() {
                self.local_z = 0;
                self.local_y += 1;
            }
        }

        Some((position, voxel))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.store.volume() - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ChunkVoxelIterator<'_> {}
