//! # Biome Configuration
//!
//! Serializable descriptions of biomes and lodes. The sampler reads these; nothing here
//! computes terrain.

use serde::{Deserialize, Serialize};

use super::structure::MajorFlora;
use crate::engine_state::voxels::block::{BlockId, AIR};

/// An ore-like override applied to stone inside a height band.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lode {
    /// Display name
    pub name: String,
    /// Block written where the lode hits
    pub block_id: BlockId,
    /// Exclusive lower bound of the height band
    pub min_height: i32,
    /// Exclusive upper bound of the height band
    pub max_height: i32,
    /// 3-D noise scale
    pub scale: f64,
    /// 3-D noise threshold
    pub threshold: f64,
    /// Offset decorrelating this lode from other noise passes
    pub noise_offset: f64,
}

/// Terrain shape and decoration parameters for one biome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeAttributes {
    /// Display name
    pub name: String,
    /// Noise offset for this biome's selection weight
    pub offset: f64,
    /// Noise scale for this biome's selection weight
    pub scale: f64,
    /// Maximum height this biome adds above solid ground
    pub terrain_height: f64,
    /// Noise scale of the height field
    pub terrain_scale: f64,
    /// Block at exactly terrain height
    pub surface_block: BlockId,
    /// Block in the few layers under the surface
    pub sub_surface_block: BlockId,

    /// Whether this biome places major flora at all
    pub place_major_flora: bool,
    /// Structure kind placed by this biome
    pub major_flora: MajorFlora,
    /// Noise scale of the zones where flora may grow
    pub major_flora_zone_scale: f64,
    /// Zone noise must exceed this
    pub major_flora_zone_threshold: f64,
    /// Noise scale of individual placements inside a zone
    pub major_flora_placement_scale: f64,
    /// Placement noise must exceed this
    pub major_flora_placement_threshold: f64,
    /// Smallest structure height
    pub min_major_flora_height: i32,
    /// Largest structure height
    pub max_major_flora_height: i32,

    /// Lodes evaluated in order; a later hit overrides an earlier one
    pub lodes: Vec<Lode>,
}

/// All terrain parameters of a world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainSettings {
    /// Height added under every biome's contribution
    pub solid_ground_height: i32,
    /// Biomes in selection order; the first wins ties
    pub biomes: Vec<BiomeAttributes>,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        TerrainSettings {
            solid_ground_height: 42,
            biomes: vec![grasslands(), desert(), forest()],
        }
    }
}

/// Lodes shared by the stock biomes.
pub fn default_lodes() -> Vec<Lode> {
    vec![
        Lode {
            name: "Dirt".to_string(),
            block_id: 6,
            min_height: 1,
            max_height: 255,
            scale: 0.1,
            threshold: 0.5,
            noise_offset: 0.0,
        },
        Lode {
            name: "Sand".to_string(),
            block_id: 5,
            min_height: 30,
            max_height: 60,
            scale: 0.2,
            threshold: 0.6,
            noise_offset: 500.0,
        },
        Lode {
            name: "Caves".to_string(),
            block_id: AIR,
            min_height: 5,
            max_height: 60,
            scale: 0.1,
            threshold: 0.55,
            noise_offset: 43534.0,
        },
    ]
}

fn grasslands() -> BiomeAttributes {
    BiomeAttributes {
        name: "Grasslands".to_string(),
        offset: 0.0,
        scale: 0.1,
        terrain_height: 22.0,
        terrain_scale: 0.25,
        surface_block: 3,
        sub_surface_block: 6,
        place_major_flora: true,
        major_flora: MajorFlora::Tree,
        major_flora_zone_scale: 1.3,
        major_flora_zone_threshold: 0.6,
        major_flora_placement_scale: 15.0,
        major_flora_placement_threshold: 0.8,
        min_major_flora_height: 3,
        max_major_flora_height: 5,
        lodes: default_lodes(),
    }
}

fn desert() -> BiomeAttributes {
    BiomeAttributes {
        name: "Desert".to_string(),
        offset: 6234.0,
        scale: 0.08,
        terrain_height: 10.0,
        terrain_scale: 0.15,
        surface_block: 5,
        sub_surface_block: 5,
        place_major_flora: true,
        major_flora: MajorFlora::Cactus,
        major_flora_zone_scale: 1.06,
        major_flora_zone_threshold: 0.5,
        major_flora_placement_scale: 2.7,
        major_flora_placement_threshold: 0.74,
        min_major_flora_height: 2,
        max_major_flora_height: 4,
        lodes: default_lodes(),
    }
}

fn forest() -> BiomeAttributes {
    BiomeAttributes {
        name: "Forest".to_string(),
        offset: 3473.0,
        scale: 0.09,
        terrain_height: 40.0,
        terrain_scale: 0.3,
        surface_block: 3,
        sub_surface_block: 6,
        place_major_flora: true,
        major_flora: MajorFlora::Tree,
        major_flora_zone_scale: 1.3,
        major_flora_zone_threshold: 0.4,
        major_flora_placement_scale: 15.0,
        major_flora_placement_threshold: 0.72,
        min_major_flora_height: 5,
        max_major_flora_height: 12,
        lodes: default_lodes(),
    }
}
