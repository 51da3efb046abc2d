//! Geometry and lighting for the voxel engine.
//!
//! This module produces everything a rendering backend needs to draw a chunk: baked
//! light, culled quads, atlas UVs and normals. GPU upload and draw submission are left
//! to the consumer of [`meshing::ChunkMesh`].
//!
//! # Architecture
//! - `meshing`: light propagation and the face-culling mesh builder
//! - `texture`: texture atlas cell lookup
//! - `tasks`: the background mesh build, which also applies queued edits

pub mod meshing;
pub mod tasks;
pub mod texture;

pub use meshing::{ChunkMesh, NeighborSnapshot};
pub use texture::TextureAtlas;
