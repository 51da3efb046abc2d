//! Files on disk for one world.
//!
//! ```text
//! <save_root>/<world name>/world.json
//! <save_root>/<world name>/chunks/<x>-<z>.chunk
//! ```
//!
//! Every write lands in a `.tmp` sibling first and is renamed into place, so a crash
//! mid-save leaves the previous file intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::core::MtResource;
use crate::engine_state::voxels::chunk::{ChunkCoord, ChunkStore};

use super::chunk_record::{decode_chunk_record, encode_chunk_record};
use super::error::PersistenceError;
use super::world_data::{WorldData, WorldDescriptor, WORLD_FORMAT_VERSION};

const WORLD_FILE: &str = "world.json";
const CHUNK_DIR: &str = "chunks";

/// Outcome of an incremental save.
#[derive(Debug, Default)]
pub struct SaveReport {
    /// Chunks written successfully
    pub written: usize,
    /// Chunks whose write failed; they stay in the modified set
    pub failed: Vec<(ChunkCoord, PersistenceError)>,
}

impl SaveReport {
    /// Returns true if every modified chunk was written.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Reads and writes one world's directory.
#[derive(Clone, Debug)]
pub struct SaveSystem {
    world_dir: PathBuf,
}

impl SaveSystem {
    /// Storage for the world `world_name` under `save_root`.
    pub fn new(save_root: impl AsRef<Path>, world_name: &str) -> Self {
        SaveSystem {
            world_dir: save_root.as_ref().join(world_name),
        }
    }

    /// Directory holding this world's files.
    pub fn world_dir(&self) -> &Path {
        &self.world_dir
    }

    fn world_file(&self) -> PathBuf {
        self.world_dir.join(WORLD_FILE)
    }

    /// Path of the record for `coord`.
    pub fn chunk_file(&self, coord: ChunkCoord) -> PathBuf {
        self.world_dir.join(CHUNK_DIR).join(format!("{coord}.chunk"))
    }

    /// Loads the world descriptor, creating and persisting a fresh one if none exists.
    ///
    /// # Arguments
    /// * `name` - World name, used only for a new world
    /// * `seed` - Seed, used only for a new world
    pub fn load_world(&self, name: &str, seed: i32) -> Result<WorldData, PersistenceError> {
        let path = self.world_file();
        match fs::read(&path) {
            Ok(bytes) => {
                let descriptor: WorldDescriptor = serde_json::from_slice(&bytes)
                    .map_err(|source| PersistenceError::CorruptWorld {
                        path: path.clone(),
                        source,
                    })?;
                if descriptor.format_version > WORLD_FORMAT_VERSION {
                    return Err(PersistenceError::UnsupportedVersion {
                        path,
                        version: descriptor.format_version,
                    });
                }
                info!(
                    "Loaded world \"{}\" (seed {}) from {}",
                    descriptor.name,
                    descriptor.seed,
                    self.world_dir.display()
                );
                Ok(WorldData::new(descriptor))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                let descriptor = WorldDescriptor::new(name, seed);
                self.save_world(&descriptor)?;
                info!("Created world \"{name}\" (seed {seed}) in {}", self.world_dir.display());
                Ok(WorldData::new(descriptor))
            }
            Err(err) => Err(PersistenceError::io(path, err)),
        }
    }

    /// Writes the world descriptor.
    pub fn save_world(&self, descriptor: &WorldDescriptor) -> Result<(), PersistenceError> {
        let path = self.world_file();
        let bytes = serde_json::to_vec_pretty(descriptor).map_err(|source| {
            PersistenceError::CorruptWorld {
                path: path.clone(),
                source,
            }
        })?;
        write_atomically(&path, &bytes)
    }

    /// Loads a saved chunk.
    ///
    /// # Returns
    /// `Ok(None)` when the chunk was never saved; an error when the file exists but
    /// cannot be read or decoded.
    pub fn load_chunk(
        &self,
        coord: ChunkCoord,
        width: usize,
        height: usize,
    ) -> Result<Option<ChunkStore>, PersistenceError> {
        let path = self.chunk_file(coord);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(PersistenceError::io(path, err)),
        };

        decode_chunk_record(&bytes, coord, width, height)
            .map(Some)
            .map_err(|reason| PersistenceError::CorruptChunk { path, reason })
    }

    /// Writes one chunk.
    pub fn save_chunk(&self, store: &ChunkStore) -> Result<(), PersistenceError> {
        write_atomically(&self.chunk_file(store.coord()), &encode_chunk_record(store))
    }

    /// Writes every chunk modified since the last save.
    ///
    /// The modified set is emptied up front so edits made while the save runs are
    /// picked up by the next one. Chunks that fail to write are put back.
    pub fn save_modified(&self, world_data: &MtResource<WorldData>) -> SaveReport {
        let pending = world_data.get_mut().take_modified();
        let mut report = SaveReport::default();

        for data in pending {
            let result = self.save_chunk(&data.map.get());
            match result {
                Ok(()) => {
                    debug!("Saved chunk {}", data.coord);
                    report.written += 1;
                }
                Err(err) => {
                    warn!("Failed to save chunk {}: {err}", data.coord);
                    report.failed.push((data.coord, err));
                }
            }
        }

        if !report.failed.is_empty() {
            world_data
                .get_mut()
                .restore_modified(report.failed.iter().map(|(coord, _)| *coord));
        }

        info!(
            "Saved {} chunk(s), {} failed",
            report.written,
            report.failed.len()
        );
        report
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| PersistenceError::io(parent, err))?;
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, bytes).map_err(|err| PersistenceError::io(&tmp_path, err))?;
    fs::rename(&tmp_path, path).map_err(|err| PersistenceError::io(path, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::persistence::ChunkData;
    use cgmath::Point3;
    use std::sync::Arc;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("voxel-world-save-{}", fastrand::u64(..)))
    }

    #[test]
    fn new_world_is_persisted_immediately() {
        let root = scratch_dir();
        let saves = SaveSystem::new(&root, "alpha");

        let created = saves.load_world("alpha", 1234).unwrap();
        assert_eq!(created.seed(), 1234);
        assert!(saves.world_dir().join(WORLD_FILE).exists());

        // the stored seed wins over the one passed in
        let loaded = saves.load_world("alpha", 99).unwrap();
        assert_eq!(loaded.seed(), 1234);
        assert_eq!(loaded.name(), "alpha");

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn missing_chunk_is_not_an_error() {
        let root = scratch_dir();
        let saves = SaveSystem::new(&root, "beta");
        assert!(saves.load_chunk(ChunkCoord::new(4, 4), 4, 4).unwrap().is_none());
    }

    #[test]
    fn corrupt_files_are_reported() {
        let root = scratch_dir();
        let saves = SaveSystem::new(&root, "gamma");
        let coord = ChunkCoord::new(1, 2);
        write_atomically(&saves.chunk_file(coord), b"VXCK\x01\x00garbage").unwrap();
        assert!(matches!(
            saves.load_chunk(coord, 4, 4),
            Err(PersistenceError::CorruptChunk { .. })
        ));

        write_atomically(&saves.world_file(), b"{ not json").unwrap();
        assert!(matches!(
            saves.load_world("gamma", 0),
            Err(PersistenceError::CorruptWorld { .. })
        ));

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn saves_only_modified_chunks() {
        let root = scratch_dir();
        let saves = SaveSystem::new(&root, "delta");
        let world = MtResource::new(saves.load_world("delta", 5).unwrap());

        let edited = ChunkCoord::new(0, 0);
        let untouched = ChunkCoord::new(1, 0);
        let mut store = ChunkStore::new(edited, 4, 8);
        store.set_id(Point3::new(1, 1, 1), 4);
        world.get_mut().insert_chunk(Arc::new(ChunkData::new(store.clone())));
        world
            .get_mut()
            .insert_chunk(Arc::new(ChunkData::new(ChunkStore::new(untouched, 4, 8))));
        world.get_mut().mark_modified(edited);

        let report = saves.save_modified(&world);
        assert_eq!(report.written, 1);
        assert!(report.is_complete());
        assert_eq!(world.get().modified_count(), 0);

        assert_eq!(saves.load_chunk(edited, 4, 8).unwrap(), Some(store));
        assert!(saves.load_chunk(untouched, 4, 8).unwrap().is_none());

        fs::remove_dir_all(root).ok();
    }
}
