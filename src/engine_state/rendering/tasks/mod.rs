//! Background tasks for the rendering system.
//!
//! # Available Tasks
//! - `ChunkMeshGenerationTask`: Applies a chunk's parked edits, relights and meshes it

pub mod chunk_mesh_generation_task;
