//! # Voxel Task System
//!
//! Background tasks for the voxel world.
//!
//! - `ChunkPopulationTask`: loads or generates a chunk's voxels
//! - `ModificationTask`: routes queued edits to the chunks that own them
//! - `WorldSaveTask`: writes modified chunks to disk

pub mod chunk_population_task;
pub mod modification_task;
pub mod world_save_task;
