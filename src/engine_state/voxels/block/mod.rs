//! # Block Module
//!
//! This module provides the block catalog: the read-only table that maps a voxel's
//! compact block id to its properties. The catalog is loaded once with the world
//! settings and shared by every chunk.

use block_type::{BlockType, FaceTextures};

pub mod block_side;
pub mod block_type;

/// The integer type used to store a block id in a voxel.
pub type BlockId = u8;

/// Empty space.
pub const AIR: BlockId = 0;
/// The unbreakable bottom layer of the world.
pub const BEDROCK: BlockId = 1;
/// Generic underground fill, the only block lodes replace.
pub const STONE: BlockId = 2;
/// Tree trunks.
pub const WOOD: BlockId = 7;
/// Tree canopies.
pub const LEAVES: BlockId = 11;
/// Cactus columns.
pub const CACTUS: BlockId = 13;

/// The table of block types indexed by [`BlockId`].
///
/// Unknown ids resolve to the air entry so a corrupt or foreign id can never make a
/// lookup fail.
#[derive(Clone, Debug)]
pub struct BlockCatalog {
    block_types: Vec<BlockType>,
    air: BlockType,
}

impl BlockCatalog {
    /// Builds a catalog from its entries. Entry `i` describes block id `i`.
    pub fn new(block_types: Vec<BlockType>) -> Self {
        BlockCatalog {
            block_types,
            air: BlockType::air(),
        }
    }

    /// Looks up the entry for `id`, falling back to air.
    #[inline]
    pub fn get(&self, id: BlockId) -> &BlockType {
        self.block_types.get(id as usize).unwrap_or(&self.air)
    }

    /// Returns true if `id` is a solid block.
    #[inline]
    pub fn is_solid(&self, id: BlockId) -> bool {
        self.get(id).is_solid
    }

    /// Number of catalog entries.
    pub fn len(&self) -> usize {
        self.block_types.len()
    }

    /// Returns true if the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.block_types.is_empty()
    }

    /// The catalog entries in id order.
    pub fn entries(&self) -> &[BlockType] {
        &self.block_types
    }
}

/// The stock block set.
pub fn default_block_types() -> Vec<BlockType> {
    vec![
        BlockType::air(),
        BlockType::opaque("Bedrock", FaceTextures::uniform(9)),
        BlockType::opaque("Stone", FaceTextures::uniform(0)),
        BlockType::opaque("Grass", FaceTextures::sided(2, 7, 1)),
        BlockType::opaque("Furnace", FaceTextures([12, 13, 14, 14, 12, 12])),
        BlockType::opaque("Sand", FaceTextures::uniform(10)),
        BlockType::opaque("Dirt", FaceTextures::uniform(1)),
        BlockType::opaque("Wood", FaceTextures::sided(5, 6, 6)),
        BlockType::opaque("Planks", FaceTextures::uniform(4)),
        BlockType::opaque("Bricks", FaceTextures::uniform(11)),
        BlockType::opaque("Cobblestone", FaceTextures::uniform(8)),
        BlockType::translucent("Leaves", 0.6, FaceTextures::uniform(16)),
        BlockType::translucent("Glass", 1.0, FaceTextures::uniform(3)),
        BlockType::opaque("Cactus", FaceTextures::sided(18, 19, 19)),
        BlockType::opaque("Cactus Top", FaceTextures::sided(18, 20, 19)),
    ]
}

impl Default for BlockCatalog {
    fn default() -> Self {
        BlockCatalog::new(default_block_types())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_ids_match_their_names() {
        let catalog = BlockCatalog::default();
        assert_eq!(catalog.len(), 15);
        assert_eq!(catalog.get(AIR).name, "Air");
        assert_eq!(catalog.get(BEDROCK).name, "Bedrock");
        assert_eq!(catalog.get(STONE).name, "Stone");
        assert_eq!(catalog.get(WOOD).name, "Wood");
        assert_eq!(catalog.get(LEAVES).name, "Leaves");
        assert_eq!(catalog.get(CACTUS).name, "Cactus");
    }

    #[test]
    fn unknown_ids_fall_back_to_air() {
        let catalog = BlockCatalog::default();
        let unknown = catalog.get(200);
        assert!(!unknown.is_solid);
        assert!(unknown.render_neighbor_faces);
        assert!(!catalog.is_solid(200));
    }
}
