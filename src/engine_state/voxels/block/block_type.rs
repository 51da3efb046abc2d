//! # Block Type Module
//!
//! Catalog entries describing how each block id behaves: whether it is solid, whether
//! the faces of neighbouring blocks are drawn against it, how much light it lets
//! through and which atlas cell each of its faces uses.

use serde::{Deserialize, Serialize};

use super::block_side::BlockSide;

/// Atlas texture index for each face, stored in [`BlockSide`] slot order
/// (back, front, top, bottom, left, right).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceTextures(pub [u16; 6]);

impl FaceTextures {
    /// Uses the same texture on every face.
    pub const fn uniform(texture: u16) -> Self {
        FaceTextures([texture; 6])
    }

    /// Uses one texture for the four sides and separate ones for top and bottom.
    pub const fn sided(side: u16, top: u16, bottom: u16) -> Self {
        FaceTextures([side, side, top, bottom, side, side])
    }

    /// The texture index for `side`.
    pub fn for_side(&self, side: BlockSide) -> u16 {
        self.0[side.slot()]
    }
}

/// A static catalog entry, indexed by a voxel's block id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockType {
    /// Display name
    pub name: String,

    /// Solid blocks emit faces and stop players
    pub is_solid: bool,

    /// Faces of neighbouring blocks are drawn against this block (air, glass, leaves)
    pub render_neighbor_faces: bool,

    /// Fraction of light passing through, in [0, 1]
    pub transparency: f32,

    /// Atlas cell for each face
    pub textures: FaceTextures,
}

impl BlockType {
    /// An opaque, solid block.
    pub fn opaque(name: &str, textures: FaceTextures) -> Self {
        BlockType {
            name: name.to_string(),
            is_solid: true,
            render_neighbor_faces: false,
            transparency: 0.0,
            textures,
        }
    }

    /// A solid block that lets neighbouring faces show through it.
    pub fn translucent(name: &str, transparency: f32, textures: FaceTextures) -> Self {
        BlockType {
            name: name.to_string(),
            is_solid: true,
            render_neighbor_faces: true,
            transparency,
            textures,
        }
    }

    /// The empty block.
    pub fn air() -> Self {
        BlockType {
            name: "Air".to_string(),
            is_solid: false,
            render_neighbor_faces: true,
            transparency: 1.0,
            textures: FaceTextures::uniform(0),
        }
    }
}
