//! # Block Side Module
//!
//! This module defines the six faces of a voxel block together with everything the
//! mesh builder needs per face: the neighbour offset used for face culling, the face
//! normal, the cube corners forming the quad and the texture slot.

use cgmath::{Point3, Vector3};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

/// The eight corners of a unit cube, indexed by the quad corner tables below.
pub const CUBE_CORNERS: [[f32; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0],
];

/// Represents the six possible faces of a voxel block.
///
/// The discriminant doubles as the texture slot in a block type's face texture table,
/// so the order is fixed: [BACK, FRONT, TOP, BOTTOM, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug, FromPrimitive)]
pub enum BlockSide {
    /// The back face (facing negative Z)
    BACK = 0,

    /// The front face (facing positive Z)
    FRONT = 1,

    /// The top face (facing positive Y)
    TOP = 2,

    /// The bottom face (facing negative Y)
    BOTTOM = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in slot order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::BACK,
            BlockSide::FRONT,
            BlockSide::TOP,
            BlockSide::BOTTOM,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// Converts a texture slot index back into a side.
    pub fn from_slot(slot: usize) -> Option<BlockSide> {
        BlockSide::from_usize(slot)
    }

    /// The texture slot of this side.
    pub fn slot(self) -> usize {
        self as usize
    }

    /// Offset from a voxel to the neighbour that shares this face.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::BACK => Vector3::new(0, 0, -1),
            BlockSide::FRONT => Vector3::new(0, 0, 1),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
        }
    }

    /// The outward unit normal of this face.
    pub fn normal(self) -> [f32; 3] {
        let offset = self.offset();
        [offset.x as f32, offset.y as f32, offset.z as f32]
    }

    /// Indices into [`CUBE_CORNERS`] for the four quad corners of this face.
    ///
    /// Corners are ordered so that triangles `(0, 1, 2)` and `(2, 1, 3)` wind
    /// clockwise when viewed from outside the block.
    pub fn corner_indices(self) -> [usize; 4] {
        match self {
            BlockSide::BACK => [0, 3, 1, 2],
            BlockSide::FRONT => [5, 6, 4, 7],
            BlockSide::TOP => [3, 7, 2, 6],
            BlockSide::BOTTOM => [1, 5, 0, 4],
            BlockSide::LEFT => [4, 7, 0, 3],
            BlockSide::RIGHT => [1, 2, 5, 6],
        }
    }

    /// The quad corners of this face for the voxel at `origin`.
    pub fn corners(self, origin: Point3<f32>) -> [[f32; 3]; 4] {
        self.corner_indices().map(|index| {
            let corner = CUBE_CORNERS[index];
            [
                origin.x + corner[0],
                origin.y + corner[1],
                origin.z + corner[2],
            ]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_lie_on_the_face_plane() {
        for side in BlockSide::all() {
            let offset = side.offset();
            let corners = side.corners(Point3::new(0.0, 0.0, 0.0));
            for corner in corners {
                // a face on the positive side of an axis sits at 1, the negative side at 0
                let (axis, direction) = if offset.x != 0 {
                    (0, offset.x)
                } else if offset.y != 0 {
                    (1, offset.y)
                } else {
                    (2, offset.z)
                };
                let expected = if direction > 0 { 1.0 } else { 0.0 };
                assert_eq!(corner[axis], expected, "{side:?}");
            }
        }
    }

    #[test]
    fn slots_round_trip() {
        for side in BlockSide::all() {
            assert_eq!(BlockSide::from_slot(side.slot()), Some(side));
        }
        assert_eq!(BlockSide::from_slot(6), None);
    }
}
