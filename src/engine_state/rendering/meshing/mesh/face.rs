//! A single emitted quad.

use cgmath::Point3;

use crate::engine_state::voxels::block::block_side::BlockSide;

/// Represents a single quad face of a voxel in the mesh.
///
/// A face is produced for every solid voxel side that borders a block its type is
/// drawn against. It carries everything needed to emit the quad's four vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Voxel position in chunk coordinates
    pub position: Point3<usize>,
    /// Which side of the block this face represents
    pub side: BlockSide,
    /// Atlas cell used for this face
    pub texture: u16,
    /// Light level of the voxel the face looks into
    pub light: f32,
    /// Whether the face belongs in the transparent pass
    pub transparent: bool,
}

impl Face {
    /// Creates a new face for the voxel at `position`.
    pub fn new(
        position: Point3<usize>,
        side: BlockSide,
        texture: u16,
        light: f32,
        transparent: bool,
    ) -> Self {
        Face {
            position,
            side,
            texture,
            light,
            transparent,
        }
    }

    /// The four corners of the quad in chunk space.
    pub fn vertices(&self) -> [[f32; 3]; 4] {
        let origin = Point3::new(
            self.position.x as f32,
            self.position.y as f32,
            self.position.z as f32,
        );
        self.side.corners(origin)
    }
}
