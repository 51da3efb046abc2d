//! In-memory form of a world: its descriptor, loaded chunks and unsaved edits.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::MtResource;
use crate::engine_state::voxels::chunk::{ChunkCoord, ChunkStore};

/// Current `world.json` format.
pub const WORLD_FORMAT_VERSION: u32 = 1;

/// The persisted world descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldDescriptor {
    /// Format of the descriptor file
    pub format_version: u32,
    /// World name
    pub name: String,
    /// Seed the terrain is generated from
    pub seed: i32,
}

impl WorldDescriptor {
    /// A descriptor in the current format.
    pub fn new(name: &str, seed: i32) -> Self {
        WorldDescriptor {
            format_version: WORLD_FORMAT_VERSION,
            name: name.to_string(),
            seed,
        }
    }
}

/// A chunk's coordinate plus its shared voxel map.
pub struct ChunkData {
    /// The chunk this data belongs to
    pub coord: ChunkCoord,
    /// The voxel store, shared with the chunk's tasks
    pub map: MtResource<ChunkStore>,
}

impl ChunkData {
    /// Wraps a populated store.
    pub fn new(store: ChunkStore) -> Self {
        ChunkData {
            coord: store.coord(),
            map: MtResource::new(store),
        }
    }
}

/// Loaded chunks of one world and the chunks edited since the last save.
pub struct WorldData {
    /// Name and seed as persisted
    pub descriptor: WorldDescriptor,
    chunks: HashMap<ChunkCoord, Arc<ChunkData>>,
    modified: BTreeSet<ChunkCoord>,
}

impl WorldData {
    /// World data with no chunks loaded.
    pub fn new(descriptor: WorldDescriptor) -> Self {
        WorldData {
            descriptor,
            chunks: HashMap::new(),
            modified: BTreeSet::new(),
        }
    }

    /// The world's name.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// The world's seed.
    pub fn seed(&self) -> i32 {
        self.descriptor.seed
    }

    /// The in-memory copy of a chunk, if it was loaded this session.
    pub fn chunk(&self, coord: ChunkCoord) -> Option<Arc<ChunkData>> {
        self.chunks.get(&coord).cloned()
    }

    /// Adds a loaded or generated chunk.
    pub fn insert_chunk(&mut self, data: Arc<ChunkData>) {
        self.chunks.insert(data.coord, data);
    }

    /// Number of chunks held in memory.
    pub fn loaded_chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Flags a loaded chunk for the next save. Unknown chunks are ignored.
    pub fn mark_modified(&mut self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord) && self.modified.insert(coord)
    }

    /// Returns true if `coord` is waiting to be saved.
    pub fn is_modified(&self, coord: ChunkCoord) -> bool {
        self.modified.contains(&coord)
    }

    /// Number of chunks waiting to be saved.
    pub fn modified_count(&self) -> usize {
        self.modified.len()
    }

    /// Empties the modified set, returning what it held with the matching chunk data.
    pub(crate) fn take_modified(&mut self) -> Vec<Arc<ChunkData>> {
        let modified = std::mem::take(&mut self.modified);
        modified
            .into_iter()
            .filter_map(|coord| self.chunks.get(&coord).cloned())
            .collect()
    }

    /// Puts chunks whose write failed back into the modified set.
    pub(crate) fn restore_modified(&mut self, coords: impl IntoIterator<Item = ChunkCoord>) {
        self.modified.extend(coords);
    }
}
