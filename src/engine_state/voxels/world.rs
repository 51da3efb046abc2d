//! # World Module
//!
//! This module provides the `World` struct, the shared state every task and the frame
//! driver work against. It owns the terrain sampler, the block catalog, the save
//! system and the chunk table, plus the three guarded queues that connect the
//! frame thread with the workers:
//!
//! - `modifications`: pending voxel edits from structures and the player
//! - `awaiting_mesh`: editable chunks that need a (re)build
//! - `draw_queue`: finished meshes waiting to be handed to the renderer
//!
//! ## Architecture
//!
//! The chunk table is sparse: a chunk exists once it entered view distance or a
//! modification reached into it. Chunks are never dropped; leaving view distance only
//! clears their `is_active` flag, so voxel data and the last mesh stay around for fast
//! reactivation.
//!
//! ## Lock Ordering
//!
//! Queue locks may be taken before the chunk table lock, never the other way round.
//! A chunk's store lock is never held while another chunk's store lock is taken.

use std::collections::HashMap;
use std::sync::Arc;

use cgmath::Point3;
use log::{debug, warn};

use crate::core::{MtResource, SharedQueue};
use crate::engine_state::persistence::{ChunkData, SaveReport, SaveSystem, WorldData};
use crate::engine_state::rendering::meshing::light::recalculate_light;
use crate::engine_state::rendering::meshing::ChunkMesh;
use crate::engine_state::rendering::texture::TextureAtlas;
use crate::engine_state::settings::WorldSettings;
use crate::engine_state::voxels::block::BlockCatalog;
use crate::engine_state::voxels::chunk::{Chunk, ChunkCoord, ChunkState, VoxelState};
use crate::engine_state::voxels::generation::noise::CoherentNoise;
use crate::engine_state::voxels::generation::TerrainSampler;
use crate::engine_state::voxels::voxel_mod::{ModificationBatch, VoxelMod};
use crate::engine_state::voxels::WorldDimensions;

/// Where a chunk's voxels came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChunkSource {
    /// Already loaded this session
    Memory,
    /// Read from a chunk record
    Disk,
    /// Freshly sampled
    Generated,
}

/// A chunk's voxels plus the structures that grew while generating them.
pub struct PopulatedChunk {
    /// The chunk's voxels
    pub data: Arc<ChunkData>,
    /// Where they came from
    pub source: ChunkSource,
    /// Structures grown during generation, one list per structure
    pub structures: Vec<Vec<VoxelMod>>,
}

/// Counters for a debug overlay.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// Chunks in the chunk table
    pub chunks: usize,
    /// Chunks without voxel data
    pub unallocated: usize,
    /// Chunks being populated
    pub populating: usize,
    /// Editable chunks with no mesh build in flight
    pub idle: usize,
    /// Chunks with a mesh build in flight
    pub meshing: usize,
    /// Chunks within view distance
    pub active: usize,
    /// Modification batches not yet routed
    pub pending_modifications: usize,
    /// Chunks queued for a mesh build
    pub awaiting_mesh: usize,
    /// Meshes not yet drained by the frame driver
    pub draw_queue: usize,
    /// Chunks edited since the last save
    pub modified: usize,
}

/// The voxel world shared by the frame driver and every task.
pub struct World {
    settings: WorldSettings,
    dimensions: WorldDimensions,
    sampler: TerrainSampler,
    catalog: BlockCatalog,
    atlas: TextureAtlas,
    save_system: SaveSystem,
    world_data: MtResource<WorldData>,
    chunks: MtResource<HashMap<ChunkCoord, Arc<Chunk>>>,
    /// Pending edits, consumed by the modification task
    pub modifications: SharedQueue<ModificationBatch>,
    /// Editable chunks waiting for a mesh build
    pub awaiting_mesh: SharedQueue<ChunkCoord>,
    /// Finished meshes, drained by the frame driver
    pub draw_queue: SharedQueue<Arc<ChunkMesh>>,
    viewer_chunk: MtResource<Option<ChunkCoord>>,
}

impl World {
    /// Creates a world with no chunks.
    ///
    /// # Arguments
    /// * `settings` - Validated settings
    /// * `save_system` - Storage for this world
    /// * `world_data` - The loaded world descriptor
    /// * `noise` - Coherent noise behind the terrain sampler
    pub fn new(
        settings: WorldSettings,
        save_system: SaveSystem,
        world_data: WorldData,
        noise: Box<dyn CoherentNoise>,
    ) -> Self {
        let dimensions = settings.dimensions();
        let sampler = TerrainSampler::new(
            world_data.seed(),
            settings.terrain.clone(),
            dimensions,
            noise,
        );

        World {
            catalog: BlockCatalog::new(settings.block_types.clone()),
            atlas: TextureAtlas::new(settings.texture_atlas_size_in_blocks),
            dimensions,
            sampler,
            save_system,
            world_data: MtResource::new(world_data),
            chunks: MtResource::new(HashMap::new()),
            modifications: SharedQueue::new(),
            awaiting_mesh: SharedQueue::new(),
            draw_queue: SharedQueue::new(),
            viewer_chunk: MtResource::new(None),
            settings,
        }
    }

    /// The settings the world was opened with.
    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    /// Chunk and world sizes.
    pub fn dimensions(&self) -> WorldDimensions {
        self.dimensions
    }

    /// The terrain sampler.
    pub fn sampler(&self) -> &TerrainSampler {
        &self.sampler
    }

    /// The block catalog.
    pub fn catalog(&self) -> &BlockCatalog {
        &self.catalog
    }

    /// The texture atlas layout.
    pub fn atlas(&self) -> &TextureAtlas {
        &self.atlas
    }

    /// Loaded chunk data and the modified set.
    pub fn world_data(&self) -> &MtResource<WorldData> {
        &self.world_data
    }

    /// The chunk the viewer was in at the last view-distance check.
    pub fn viewer_chunk(&self) -> Option<ChunkCoord> {
        *self.viewer_chunk.get()
    }

    pub(crate) fn set_viewer_chunk(&self, coord: ChunkCoord) {
        *self.viewer_chunk.get_mut() = Some(coord);
    }

    /// Returns true if `coord` is within `distance` chunks of the viewer.
    pub fn is_near_viewer(&self, coord: ChunkCoord, distance: i32) -> bool {
        self.viewer_chunk()
            .is_some_and(|viewer| viewer.chebyshev_distance(&coord) <= distance)
    }

    /// The chunk at `coord`, if it has been allocated.
    pub fn chunk(&self, coord: ChunkCoord) -> Option<Arc<Chunk>> {
        self.chunks.get().get(&coord).cloned()
    }

    /// Returns the chunk at `coord`, creating an unallocated one if needed.
    ///
    /// # Returns
    /// `None` if `coord` lies outside the world.
    pub fn chunk_or_allocate(&self, coord: ChunkCoord) -> Option<Arc<Chunk>> {
        if !self.dimensions.contains_chunk(coord) {
            return None;
        }
        if let Some(chunk) = self.chunk(coord) {
            return Some(chunk);
        }
        let mut chunks = self.chunks.get_mut();
        let chunk = chunks
            .entry(coord)
            .or_insert_with(|| Arc::new(Chunk::new(coord)));
        Some(chunk.clone())
    }

    /// Voxel data of an editable chunk.
    pub fn editable_chunk_data(&self, coord: ChunkCoord) -> Option<Arc<ChunkData>> {
        let chunk = self.chunk(coord)?;
        if !chunk.is_editable() {
            return None;
        }
        chunk.data().cloned()
    }

    /// Finds a chunk's voxels: in memory, then on disk, then from the sampler.
    ///
    /// A chunk record that exists but cannot be read is logged and regenerated.
    /// Loaded and generated chunks are added to the world data and come back lit.
    pub fn request_chunk_data(&self, coord: ChunkCoord) -> PopulatedChunk {
        if let Some(data) = self.world_data.get().chunk(coord) {
            return PopulatedChunk {
                data,
                source: ChunkSource::Memory,
                structures: Vec::new(),
            };
        }

        let width = self.dimensions.chunk_width;
        let height = self.dimensions.chunk_height;
        let (mut store, source, structures) =
            match self.save_system.load_chunk(coord, width, height) {
                Ok(Some(store)) => (store, ChunkSource::Disk, Vec::new()),
                Ok(None) => {
                    let (store, structures) = self.sampler.populate_chunk(coord);
                    (store, ChunkSource::Generated, structures)
                }
                Err(err) => {
                    warn!("{err}; regenerating chunk {coord}");
                    let (store, structures) = self.sampler.populate_chunk(coord);
                    (store, ChunkSource::Generated, structures)
                }
            };

        if source == ChunkSource::Generated {
            recalculate_light(&mut store, &self.catalog, self.settings.light_falloff);
        }

        let data = Arc::new(ChunkData::new(store));
        self.world_data.get_mut().insert_chunk(data.clone());
        PopulatedChunk {
            data,
            source,
            structures,
        }
    }

    /// Queues an editable chunk for meshing.
    ///
    /// # Arguments
    /// * `coord` - The chunk
    /// * `priority` - Edits go to the front, everything else to the back
    pub fn queue_mesh(&self, coord: ChunkCoord, priority: bool) {
        if priority {
            self.awaiting_mesh.push_front_unique(coord);
        } else {
            self.awaiting_mesh.push_back_unique(coord);
        }
    }

    /// Pops the first queued chunk that is free to mesh and claims it.
    ///
    /// Chunks with a build already in flight stay queued for the next pass.
    pub fn next_chunk_to_mesh(&self) -> Option<Arc<Chunk>> {
        let coord = self.awaiting_mesh.pop_first_where(|coord| {
            self.chunk(*coord)
                .is_some_and(|chunk| chunk.try_begin_meshing())
        })?;
        self.chunk(coord)
    }

    /// The stored state of a voxel in an editable chunk.
    pub fn voxel_state(&self, position: Point3<i32>) -> Option<VoxelState> {
        if !self.dimensions.contains_voxel(position) {
            return None;
        }
        let coord = ChunkCoord::from_voxel(position, self.dimensions.chunk_width);
        let data = self.editable_chunk_data(coord)?;
        let store = data.map.get();
        store.get(store.world_to_local(position)).copied()
    }

    /// Returns true if the voxel at `position` is solid.
    ///
    /// Voxels of chunks that are not editable yet are answered by the sampler.
    pub fn check_for_voxel(&self, position: Point3<i32>) -> bool {
        let id = match self.voxel_state(position) {
            Some(voxel) => voxel.id,
            None => self.sampler.get_voxel(position),
        };
        self.catalog.is_solid(id)
    }

    /// Index of the strongest biome at `position`.
    pub fn biome_index(&self, position: Point3<i32>) -> usize {
        self.sampler.biome_index(position)
    }

    /// Flags a chunk for the next incremental save.
    pub fn mark_modified(&self, coord: ChunkCoord) {
        if self.world_data.get_mut().mark_modified(coord) {
            debug!("Chunk {coord} marked modified");
        }
    }

    /// Writes every modified chunk to disk.
    pub fn save_modified(&self) -> SaveReport {
        self.save_system.save_modified(&self.world_data)
    }

    /// Every chunk currently known.
    pub fn chunk_coords(&self) -> Vec<ChunkCoord> {
        self.chunks.get().keys().copied().collect()
    }

    /// Counts chunks per lifecycle state and reads the queue lengths.
    pub fn stats(&self) -> WorldStats {
        let mut stats = WorldStats::default();
        for chunk in self.chunks.get().values() {
            stats.chunks += 1;
            match chunk.state() {
                ChunkState::Unallocated => stats.unallocated += 1,
                ChunkState::Populating => stats.populating += 1,
                ChunkState::Idle => stats.idle += 1,
                ChunkState::Meshing => stats.meshing += 1,
            }
            if chunk.is_active() {
                stats.active += 1;
            }
        }
        stats.pending_modifications = self.modifications.len();
        stats.awaiting_mesh = self.awaiting_mesh.len();
        stats.draw_queue = self.draw_queue.len();
        stats.modified = self.world_data.get().modified_count();
        stats
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::engine_state::persistence::WorldDescriptor;
    use crate::engine_state::voxels::generation::noise::FlatNoise;

    /// A small world over flat noise in a scratch directory.
    pub fn flat_world() -> World {
        let mut settings = WorldSettings::default();
        settings.chunk_width = 4;
        settings.chunk_height = 32;
        settings.world_size_in_chunks = 4;
        settings.view_distance = 1;
        settings.load_distance = 2;
        settings.terrain.solid_ground_height = 10;
        settings.save_root =
            std::env::temp_dir().join(format!("voxel-world-unit-{}", fastrand::u64(..)));

        let save_system = SaveSystem::new(&settings.save_root, "unit");
        let world_data = WorldData::new(WorldDescriptor::new("unit", 1));
        World::new(settings, save_system, world_data, Box::new(FlatNoise(0.0)))
    }
}
