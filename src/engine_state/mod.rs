//! # Engine State Module
//!
//! The core engine module that keeps a voxel world loaded around a moving viewer.
//!
//! ## Key Components
//!
//! * `EngineState` - The per-frame driver
//! * `persistence` - World descriptors and chunk records on disk
//! * `rendering` - Lighting, face culling and the mesh task
//! * `settings` - The configuration surface
//! * `task_management` - The worker pool
//! * `voxels` - Blocks, chunks, terrain generation and the shared `World`
//!
//! ## Frame Loop
//!
//! Each call to [`EngineState::update`]:
//! 1. Rechecks view distance if the viewer changed chunk, activating, deactivating
//!    and queueing population of chunks
//! 2. Dispatches one modification task when edits are waiting and none is running
//! 3. Dispatches a mesh task for every queued chunk that is free to mesh
//! 4. Hands queued tasks to workers and handles completed results
//! 5. Drains finished meshes whose chunk is editable
//!
//! ## Performance Considerations
//!
//! * Everything CPU-heavy (population, meshing, lighting, saving) runs on workers
//! * The frame thread only moves coordinates and `Arc`s between queues

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use cgmath::Point3;
use log::{debug, info, warn};

use persistence::{PersistenceError, SaveReport, SaveSystem};
use rendering::meshing::ChunkMesh;
use rendering::tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask;
use settings::{SettingsError, WorldSettings};
use task_management::task::TaskKind;
use task_management::TaskManager;
use voxels::chunk::ChunkCoord;
use voxels::generation::noise::{CoherentNoise, PerlinNoise};
use voxels::tasks::chunk_population_task::ChunkPopulationTask;
use voxels::tasks::modification_task::ModificationTask;
use voxels::tasks::world_save_task::WorldSaveTask;
use voxels::voxel_mod::{ModificationBatch, VoxelMod};
use voxels::world::{World, WorldStats};

use self::voxels::block::BlockId;

pub mod persistence;
pub mod rendering;
pub mod settings;
pub mod task_management;
pub mod voxels;

/// Upper bound on frames spent applying outstanding edits at shutdown.
const SHUTDOWN_FRAME_LIMIT: usize = 100_000;

/// Errors that stop a world from opening.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// The settings are invalid
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// The world could not be loaded
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// A finished mesh for the renderer.
#[derive(Clone, Debug)]
pub struct ChunkMeshUpdate {
    /// The chunk the mesh belongs to
    pub coord: ChunkCoord,
    /// The finished geometry
    pub mesh: Arc<ChunkMesh>,
    /// Whether the chunk is within view distance right now
    pub is_active: bool,
}

/// Everything the renderer needs to know after one frame.
#[derive(Clone, Debug, Default)]
pub struct FrameUpdate {
    /// Meshes built since the last frame, in completion order
    pub meshes: Vec<ChunkMeshUpdate>,
    /// Chunks that entered view distance
    pub activated: Vec<ChunkCoord>,
    /// Chunks that left view distance; their meshes are kept
    pub deactivated: Vec<ChunkCoord>,
}

impl FrameUpdate {
    /// Returns true if nothing changed this frame.
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty() && self.activated.is_empty() && self.deactivated.is_empty()
    }

    /// Appends another frame's updates to this one.
    pub fn merge(&mut self, other: FrameUpdate) {
        self.meshes.extend(other.meshes);
        self.activated.extend(other.activated);
        self.deactivated.extend(other.deactivated);
    }
}

/// The per-frame driver of one open world.
///
/// # Examples
///
/// ```ignore
/// let mut engine_state = EngineState::new(WorldSettings::default(), "world", 1337)?;
///
/// loop {
///     let update = engine_state.update(camera_position);
///     for mesh in update.meshes {
///         renderer.upload(mesh.coord, &mesh.mesh);
///     }
/// }
/// ```
pub struct EngineState {
    /// Task manager for background work
    pub task_manager: TaskManager,
    /// The world shared with every task
    world: Arc<World>,
    /// Chunk the viewer was in at the last update
    current_viewer_chunk: Option<ChunkCoord>,
    /// Chunks flagged active by the last view-distance check
    active_chunks: HashSet<ChunkCoord>,
}

impl EngineState {
    /// Opens (or creates) the world `name` with Perlin terrain.
    ///
    /// # Arguments
    /// * `settings` - Engine configuration
    /// * `name` - World name, also its directory under `save_root`
    /// * `seed` - Seed for a new world; an existing world keeps its own
    pub fn new(settings: WorldSettings, name: &str, seed: i32) -> Result<Self, EngineError> {
        Self::with_noise(settings, name, seed, |seed| {
            Box::new(PerlinNoise::new(seed as u32))
        })
    }

    /// Opens a world over a custom noise source.
    ///
    /// # Arguments
    /// * `make_noise` - Builds the noise from the world's effective seed
    pub fn with_noise(
        settings: WorldSettings,
        name: &str,
        seed: i32,
        make_noise: impl FnOnce(i32) -> Box<dyn CoherentNoise>,
    ) -> Result<Self, EngineError> {
        settings.validate()?;

        let save_system = SaveSystem::new(&settings.save_root, name);
        let world_data = save_system.load_world(name, seed)?;
        let noise = make_noise(world_data.seed());
        let task_manager = TaskManager::new(settings.effective_worker_count());
        let world = Arc::new(World::new(settings, save_system, world_data, noise));

        Ok(EngineState {
            task_manager,
            world,
            current_viewer_chunk: None,
            active_chunks: HashSet::new(),
        })
    }

    /// The shared world.
    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    /// Debug counters of the shared world.
    pub fn stats(&self) -> WorldStats {
        self.world.stats()
    }

    /// Runs one frame of the lifecycle for a viewer at `viewer`.
    pub fn update(&mut self, viewer: Point3<f32>) -> FrameUpdate {
        let mut update = FrameUpdate::default();

        let viewer_chunk = ChunkCoord::from_viewer(viewer, self.world.dimensions().chunk_width);
        if self.current_viewer_chunk != Some(viewer_chunk) {
            self.check_view_distance(viewer_chunk, &mut update);
            self.current_viewer_chunk = Some(viewer_chunk);
        }

        self.pump_tasks(&mut update);
        update
    }

    /// Dispatches modification and mesh tasks, handles finished results and drains
    /// the draw queue into `update`.
    fn pump_tasks(&mut self, update: &mut FrameUpdate) {
        if !self.world.modifications.is_empty()
            && self.task_manager.pending(TaskKind::Modification) == 0
        {
            self.task_manager
                .publish_task(Box::new(ModificationTask::new(self.world.clone())));
        }

        while let Some(chunk) = self.world.next_chunk_to_mesh() {
            self.task_manager.publish_task(Box::new(ChunkMeshGenerationTask::new(
                self.world.clone(),
                chunk.coord,
            )));
        }

        self.task_manager.process_queued_tasks();
        self.task_manager.process_completed_tasks(&self.world);

        let world = &self.world;
        while let Some(mesh) = world.draw_queue.pop_front_if(|mesh| {
            world
                .chunk(mesh.coord)
                .is_some_and(|chunk| chunk.is_editable())
        }) {
            let is_active = world.chunk(mesh.coord).is_some_and(|chunk| chunk.is_active());
            update.meshes.push(ChunkMeshUpdate {
                coord: mesh.coord,
                mesh,
                is_active,
            });
        }
    }

    /// Returns true while an accepted edit has not reached its chunk's store yet.
    fn has_unapplied_edits(&self) -> bool {
        !self.world.modifications.is_empty()
            || !self.world.awaiting_mesh.is_empty()
            || self.task_manager.pending(TaskKind::Modification) > 0
            || self.task_manager.pending(TaskKind::ChunkMesh) > 0
    }

    /// Runs modification and mesh work until every accepted edit is applied, or
    /// `max_frames` have passed.
    ///
    /// # Returns
    /// `true` if nothing was left unapplied.
    fn flush_edits(&mut self, max_frames: usize) -> bool {
        let mut update = FrameUpdate::default();
        for _ in 0..max_frames {
            if !self.has_unapplied_edits() {
                return true;
            }
            self.pump_tasks(&mut update);
            if !self.task_manager.is_inline() {
                std::thread::sleep(Duration::from_millis(1));
            }
        }
        !self.has_unapplied_edits()
    }

    /// Recomputes the in-range square around `center`.
    ///
    /// New chunks are allocated and queued for population nearest first. Chunks that
    /// fall out of range are only deactivated.
    fn check_view_distance(&mut self, center: ChunkCoord, update: &mut FrameUpdate) {
        let view_distance = self.world.settings().view_distance;
        let dimensions = self.world.dimensions();
        self.world.set_viewer_chunk(center);

        let mut in_range: Vec<ChunkCoord> = (-view_distance..=view_distance)
            .flat_map(|dx| (-view_distance..=view_distance).map(move |dz| center.offset(dx, dz)))
            .filter(|coord| dimensions.contains_chunk(*coord))
            .collect();
        in_range.sort_by_key(|coord| (coord.chebyshev_distance(&center), coord.x, coord.z));

        let previously_active = std::mem::take(&mut self.active_chunks);
        let mut queued = 0;
        for coord in in_range {
            let Some(chunk) = self.world.chunk_or_allocate(coord) else {
                continue;
            };
            if !chunk.is_active() {
                chunk.set_active(true);
                update.activated.push(coord);
            }
            if chunk.mark_creation_queued() {
                self.task_manager
                    .publish_task(Box::new(ChunkPopulationTask::new(self.world.clone(), coord)));
                queued += 1;
            }
            self.active_chunks.insert(coord);
        }

        for coord in previously_active.difference(&self.active_chunks) {
            if let Some(chunk) = self.world.chunk(*coord) {
                chunk.set_active(false);
                update.deactivated.push(*coord);
            }
        }

        debug!(
            "Viewer entered chunk {center}: {} active, {queued} queued for population",
            self.active_chunks.len()
        );
    }

    /// Requests a single-voxel edit.
    ///
    /// # Returns
    /// `false` (and no effect) if the position is outside the world, the id is not in
    /// the catalog, or the owning chunk is not editable yet.
    pub fn edit_voxel(&mut self, position: Point3<i32>, id: BlockId) -> bool {
        let dimensions = self.world.dimensions();
        if !dimensions.contains_voxel(position) {
            debug!("Rejected edit at {position:?}: outside the world");
            return false;
        }
        if id as usize >= self.world.catalog().len() {
            debug!("Rejected edit at {position:?}: unknown block id {id}");
            return false;
        }
        let owner = ChunkCoord::from_voxel(position, dimensions.chunk_width);
        if self.world.editable_chunk_data(owner).is_none() {
            debug!("Rejected edit at {position:?}: chunk {owner} is not editable");
            return false;
        }

        self.world
            .modifications
            .push_back(ModificationBatch::player(VoxelMod::new(position, id)));
        true
    }

    /// Starts a background save of every modified chunk.
    ///
    /// # Returns
    /// `false` if a save is already running.
    pub fn request_save(&mut self) -> bool {
        if self.task_manager.pending(TaskKind::WorldSave) > 0 {
            return false;
        }
        self.task_manager
            .publish_task(Box::new(WorldSaveTask::new(self.world.clone())));
        true
    }

    /// Saves every modified chunk on the calling thread.
    pub fn save_now(&self) -> SaveReport {
        self.world.save_modified()
    }

    /// Returns true when no work is queued, running, or waiting to be drained.
    pub fn is_idle(&self) -> bool {
        self.task_manager.is_idle()
            && self.world.modifications.is_empty()
            && self.world.awaiting_mesh.is_empty()
            && self.world.draw_queue.is_empty()
    }

    /// Runs frames until the engine is idle or `max_frames` have passed.
    ///
    /// # Returns
    /// Every update produced along the way, merged.
    pub fn run_until_idle(&mut self, viewer: Point3<f32>, max_frames: usize) -> FrameUpdate {
        let mut merged = FrameUpdate::default();
        for _ in 0..max_frames {
            merged.merge(self.update(viewer));
            if self.is_idle() {
                break;
            }
            if !self.task_manager.is_inline() {
                std::thread::sleep(Duration::from_millis(1));
            }
        }
        merged
    }

    /// Applies outstanding edits, stops the workers between tasks, then writes every
    /// modified chunk.
    pub fn shutdown(&mut self) -> SaveReport {
        if !self.flush_edits(SHUTDOWN_FRAME_LIMIT) {
            warn!("Edits were still pending after {SHUTDOWN_FRAME_LIMIT} shutdown frames");
        }
        self.task_manager.shutdown();
        let report = self.save_now();
        info!("World \"{}\" closed", self.world.world_data().get().name());
        report
    }
}
