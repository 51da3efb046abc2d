//! Chunk grid coordinates.

use cgmath::Point3;
use serde::{Deserialize, Serialize};

/// Identifies a chunk column in the world grid. One unit is one chunk width.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    /// Grid position along the world X axis
    pub x: i32,
    /// Grid position along the world Z axis
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a coordinate from its grid components.
    pub const fn new(x: i32, z: i32) -> Self {
        ChunkCoord { x, z }
    }

    /// The chunk containing the voxel at `position`.
    pub fn from_voxel(position: Point3<i32>, chunk_width: usize) -> Self {
        let width = chunk_width as i32;
        ChunkCoord {
            x: position.x.div_euclid(width),
            z: position.z.div_euclid(width),
        }
    }

    /// The chunk containing a continuous viewer position.
    pub fn from_viewer(position: Point3<f32>, chunk_width: usize) -> Self {
        let width = chunk_width as f32;
        ChunkCoord {
            x: (position.x / width).floor() as i32,
            z: (position.z / width).floor() as i32,
        }
    }

    /// World position of the chunk's voxel at local (0, 0, 0).
    pub fn world_origin(&self, chunk_width: usize) -> Point3<i32> {
        let width = chunk_width as i32;
        Point3::new(self.x * width, 0, self.z * width)
    }

    /// The coordinate `dx`, `dz` chunks away.
    pub fn offset(&self, dx: i32, dz: i32) -> Self {
        ChunkCoord {
            x: self.x + dx,
            z: self.z + dz,
        }
    }

    /// The four chunks sharing a vertical face with this one: -X, +X, -Z, +Z.
    pub fn neighbors(&self) -> [ChunkCoord; 4] {
        [
            self.offset(-1, 0),
            self.offset(1, 0),
            self.offset(0, -1),
            self.offset(0, 1),
        ]
    }

    /// Chessboard distance, which matches the square view area.
    pub fn chebyshev_distance(&self, other: &ChunkCoord) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.x, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_positions_round_down() {
        assert_eq!(
            ChunkCoord::from_voxel(Point3::new(-1, 10, 15), 16),
            ChunkCoord::new(-1, 0)
        );
        assert_eq!(
            ChunkCoord::from_voxel(Point3::new(16, 0, -16), 16),
            ChunkCoord::new(1, -1)
        );
        assert_eq!(
            ChunkCoord::from_viewer(Point3::new(-0.5, 80.0, 31.9), 16),
            ChunkCoord::new(-1, 1)
        );
    }

    #[test]
    fn distance_is_chessboard() {
        let origin = ChunkCoord::new(0, 0);
        assert_eq!(origin.chebyshev_distance(&ChunkCoord::new(3, -2)), 3);
        assert_eq!(origin.to_string(), "0-0");
    }
}
