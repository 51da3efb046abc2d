//! Mesh data structures for voxel rendering.
//!
//! # Architecture
//! - [`ChunkMesh`]: The per-chunk geometry payload with opaque and transparent index lists
//! - [`Face`]: A single visible voxel side, the unit the mesh builder emits
//!
//! # Usage
//! ```ignore
//! let mut mesh = ChunkMesh::new(ChunkCoord::new(0, 0));
//! mesh.add_face(&Face::new(Point3::new(0, 0, 0), BlockSide::TOP, 7, 1.0, false), &atlas);
//! assert_eq!(mesh.quad_count(), 1);
//! ```

mod face;
mod mesh;

pub use face::Face;
pub use mesh::ChunkMesh;
