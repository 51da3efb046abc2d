//! # Chunk Module
//!
//! This module provides the `Chunk` struct, which tracks one chunk column through its
//! lifecycle, plus the voxel store, coordinates and iteration helpers it is built from.
//!
//! ## Lifecycle
//!
//! ```text
//! Unallocated ──► Populating ──► Idle ⇄ Meshing
//! ```
//!
//! - **Unallocated**: the chunk is known (it entered view distance, or a structure
//!   reached into it) but has no voxel data. Modifications that target it are parked.
//! - **Populating**: a worker is filling its store from memory, disk or the sampler.
//! - **Idle** / **Meshing**: the chunk is *editable*. At most one mesh build runs per
//!   chunk; the build applies parked modifications before it meshes, so edits and
//!   meshing never race on the store.
//!
//! Visibility (`is_active`) is orthogonal to the lifecycle and driven purely by the
//! viewer's distance.
//!
//! ## Thread Safety
//!
//! State is an atomic so the frame driver can read it without locking. The voxel data
//! is set once and then shared behind its own lock.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::core::{MtResource, SharedQueue};
use crate::engine_state::persistence::ChunkData;
use crate::engine_state::rendering::meshing::ChunkMesh;
use crate::engine_state::voxels::voxel_mod::VoxelMod;

pub mod chunk_coord;
pub mod chunk_iteration;
pub mod chunk_store;

pub use chunk_coord::ChunkCoord;
pub use chunk_store::{ChunkStore, VoxelLookup, VoxelState};

/// Lifecycle state of a chunk.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u8)]
pub enum ChunkState {
    /// Known but without voxel data
    Unallocated = 0,
    /// Voxel data is being loaded or generated
    Populating = 1,
    /// Editable, no mesh build in flight
    Idle = 2,
    /// Editable, a mesh build is in flight
    Meshing = 3,
}

/// One chunk column and its lifecycle bookkeeping.
pub struct Chunk {
    /// Position of this chunk in the chunk grid
    pub coord: ChunkCoord,
    data: OnceLock<Arc<ChunkData>>,
    state: AtomicU8,
    creation_queued: AtomicBool,
    is_active: AtomicBool,
    pending_mods: SharedQueue<VoxelMod>,
    mesh: MtResource<Option<Arc<ChunkMesh>>>,
}

impl Chunk {
    /// Creates an unallocated chunk.
    pub fn new(coord: ChunkCoord) -> Self {
        Chunk {
            coord,
            data: OnceLock::new(),
            state: AtomicU8::new(ChunkState::Unallocated as u8),
            creation_queued: AtomicBool::new(false),
            is_active: AtomicBool::new(false),
            pending_mods: SharedQueue::new(),
            mesh: MtResource::new(None),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ChunkState {
        ChunkState::from_u8(self.state.load(Ordering::Acquire)).unwrap_or(ChunkState::Unallocated)
    }

    /// Atomically moves from `from` to `to`.
    ///
    /// # Returns
    /// `true` if the chunk was in `from` and is now in `to`.
    pub fn transition(&self, from: ChunkState, to: ChunkState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Population has finished: the chunk accepts edits and mesh requests.
    pub fn is_editable(&self) -> bool {
        matches!(self.state(), ChunkState::Idle | ChunkState::Meshing)
    }

    /// Claims the chunk for a mesh build. Only one caller can win per build.
    pub fn try_begin_meshing(&self) -> bool {
        self.transition(ChunkState::Idle, ChunkState::Meshing)
    }

    /// The chunk's voxel data, once population has stored it.
    pub fn data(&self) -> Option<&Arc<ChunkData>> {
        self.data.get()
    }

    /// Stores the populated voxel data. Later calls are ignored.
    ///
    /// # Returns
    /// `true` if this call stored the data.
    pub fn set_data(&self, data: Arc<ChunkData>) -> bool {
        self.data.set(data).is_ok()
    }

    /// Marks the chunk as handed to a population task.
    ///
    /// # Returns
    /// `true` for the first caller only, so a chunk is never populated twice.
    pub fn mark_creation_queued(&self) -> bool {
        !self.creation_queued.swap(true, Ordering::AcqRel)
    }

    /// Returns true once a population task has been queued for this chunk.
    pub fn is_creation_queued(&self) -> bool {
        self.creation_queued.load(Ordering::Acquire)
    }

    /// Whether the chunk is within view distance.
    pub fn is_active(&self) -> bool {
        self.is_active.load(Ordering::Acquire)
    }

    /// Updates the visibility flag.
    pub fn set_active(&self, active: bool) {
        self.is_active.store(active, Ordering::Release);
    }

    /// Parks a modification until the next mesh build of this chunk.
    pub fn queue_modification(&self, modification: VoxelMod) {
        self.pending_mods.push_back(modification);
    }

    /// Takes every parked modification in arrival order.
    pub fn take_pending_modifications(&self) -> Vec<VoxelMod> {
        self.pending_mods.drain_all()
    }

    /// Number of parked modifications.
    pub fn pending_modification_count(&self) -> usize {
        self.pending_mods.len()
    }

    /// The most recently built mesh, kept for fast reactivation.
    pub fn mesh(&self) -> Option<Arc<ChunkMesh>> {
        self.mesh.get().clone()
    }

    /// Replaces the retained mesh.
    pub fn set_mesh(&self, mesh: Arc<ChunkMesh>) {
        *self.mesh.get_mut() = Some(mesh);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_transitions_are_exclusive() {
        let chunk = Chunk::new(ChunkCoord::new(1, 1));
        assert_eq!(chunk.state(), ChunkState::Unallocated);
        assert!(!chunk.is_editable());
        assert!(!chunk.try_begin_meshing());

        assert!(chunk.transition(ChunkState::Unallocated, ChunkState::Populating));
        assert!(!chunk.transition(ChunkState::Unallocated, ChunkState::Populating));
        assert!(chunk.transition(ChunkState::Populating, ChunkState::Idle));
        assert!(chunk.is_editable());

        assert!(chunk.try_begin_meshing());
        assert!(!chunk.try_begin_meshing());
        assert!(chunk.is_editable());
    }

    #[test]
    fn creation_is_claimed_once() {
        let chunk = Chunk::new(ChunkCoord::new(0, 0));
        assert!(!chunk.is_creation_queued());
        assert!(chunk.mark_creation_queued());
        assert!(!chunk.mark_creation_queued());
        assert!(chunk.is_creation_queued());
    }
}
