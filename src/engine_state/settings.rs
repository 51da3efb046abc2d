//! World configuration.
//!
//! Settings live in a JSON file next to the binary. Every field has a default, so a
//! partial or missing file still loads, and the effective settings are written back
//! so the file always lists every option.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::voxels::block::block_type::BlockType;
use super::voxels::block::default_block_types;
use super::voxels::generation::biome::TerrainSettings;
use super::voxels::WorldDimensions;

/// Errors from loading or validating settings.
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    /// The settings file could not be read or written
    #[error("I/O error on settings file \"{}\": {source}", path.display())]
    Io {
        /// The settings file
        path: PathBuf,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },
    /// The settings file is not valid JSON for these settings
    #[error("failed to parse settings file \"{}\": {source}", path.display())]
    Parse {
        /// The settings file
        path: PathBuf,
        /// The parse error
        #[source]
        source: serde_json::Error,
    },
    /// A value is out of range
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Everything the engine reads from configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    /// Chunks within this Chebyshev distance of the viewer are active
    pub view_distance: i32,
    /// Structures may trigger population of chunks up to this distance
    pub load_distance: i32,
    /// Run tasks on worker threads instead of inline
    pub enable_threading: bool,
    /// Worker threads; 0 uses the available parallelism
    pub worker_count: usize,
    /// Width and depth of the world, in chunks
    pub world_size_in_chunks: usize,
    /// Width and depth of a chunk, in voxels
    pub chunk_width: usize,
    /// Height of a chunk, in voxels
    pub chunk_height: usize,
    /// Cells per row of the square texture atlas
    pub texture_atlas_size_in_blocks: u32,
    /// Light lost per propagation step
    pub light_falloff: f32,
    /// Directory holding one sub-directory per world
    pub save_root: PathBuf,
    /// Biomes and lodes
    pub terrain: TerrainSettings,
    /// The block catalog, indexed by block id
    pub block_types: Vec<BlockType>,
}

impl Default for WorldSettings {
    fn default() -> Self {
        WorldSettings {
            view_distance: 5,
            load_distance: 7,
            enable_threading: true,
            worker_count: 0,
            world_size_in_chunks: 100,
            chunk_width: 16,
            chunk_height: 128,
            texture_atlas_size_in_blocks: 16,
            light_falloff: 0.08,
            save_root: PathBuf::from("saves"),
            terrain: TerrainSettings::default(),
            block_types: default_block_types(),
        }
    }
}

impl WorldSettings {
    /// Loads settings from `path`, falling back to defaults if the file is missing,
    /// then writes the effective settings back.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let settings = match fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("No settings at {}, using defaults", path.display());
                WorldSettings::default()
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        settings.validate()?;
        if let Err(err) = settings.save(path) {
            warn!("Could not write settings back: {err}");
        }
        Ok(settings)
    }

    /// Writes the settings as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Rejects settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let invalid = |reason: &str| Err(SettingsError::Invalid(reason.to_string()));

        if self.chunk_width == 0 || self.chunk_height == 0 || self.world_size_in_chunks == 0 {
            return invalid("chunk and world dimensions must be positive");
        }
        if self.chunk_width > u16::MAX as usize || self.chunk_height > u16::MAX as usize {
            return invalid("chunk dimensions must fit in 16 bits");
        }
        let world_size_in_voxels = self.world_size_in_chunks.checked_mul(self.chunk_width);
        if world_size_in_voxels.map_or(true, |size| size > i32::MAX as usize) {
            return invalid("the world must be at most i32::MAX voxels wide");
        }
        if self.view_distance < 0 {
            return invalid("view distance must not be negative");
        }
        if self.load_distance < self.view_distance {
            return invalid("load distance must be at least the view distance");
        }
        if self.terrain.biomes.is_empty() {
            return invalid("at least one biome is required");
        }
        if self.block_types.is_empty() || self.block_types.len() > 256 {
            return invalid("the block catalog must hold between 1 and 256 entries");
        }
        if !(self.light_falloff > 0.0 && self.light_falloff <= 1.0) {
            return invalid("light falloff must be in (0, 1]");
        }
        if self.texture_atlas_size_in_blocks == 0 {
            return invalid("the texture atlas must be at least one block wide");
        }
        Ok(())
    }

    /// Chunk and world sizes.
    pub fn dimensions(&self) -> WorldDimensions {
        WorldDimensions {
            chunk_width: self.chunk_width,
            chunk_height: self.chunk_height,
            world_size_in_chunks: self.world_size_in_chunks,
        }
    }

    /// Worker threads to start, or 0 for inline execution.
    pub fn effective_worker_count(&self) -> usize {
        if !self.enable_threading {
            return 0;
        }
        if self.worker_count > 0 {
            return self.worker_count;
        }
        std::thread::available_parallelism()
            .map(|count| count.get())
            .unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = WorldSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.block_types.len(), 15);
        assert_eq!(settings.terrain.biomes.len(), 3);
        assert_eq!(settings.dimensions().world_size_in_voxels(), 1600);
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let settings: WorldSettings =
            serde_json::from_str(r#"{ "view_distance": 2, "enable_threading": false }"#).unwrap();
        assert_eq!(settings.view_distance, 2);
        assert_eq!(settings.load_distance, 7);
        assert_eq!(settings.effective_worker_count(), 0);
    }

    #[test]
    fn load_writes_defaults_back() {
        let path = std::env::temp_dir()
            .join(format!("voxel-world-settings-{}.json", fastrand::u64(..)));
        let loaded = WorldSettings::load(&path).unwrap();
        assert_eq!(loaded, WorldSettings::default());
        assert!(path.exists());

        let reloaded = WorldSettings::load(&path).unwrap();
        assert_eq!(reloaded, loaded);
        fs::remove_file(path).ok();
    }

    #[test]
    fn rejects_nonsense() {
        let mut settings = WorldSettings::default();
        settings.load_distance = 1;
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));

        let mut settings = WorldSettings::default();
        settings.terrain.biomes.clear();
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn world_must_fit_in_i32_coordinates() {
        let mut settings = WorldSettings::default();
        settings.chunk_width = 1024;
        settings.world_size_in_chunks = 1 << 21;
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));

        settings.world_size_in_chunks = (i32::MAX as usize) / 1024;
        assert!(settings.validate().is_ok());
        assert!(settings.dimensions().world_size_in_voxels() > 0);
    }
}
