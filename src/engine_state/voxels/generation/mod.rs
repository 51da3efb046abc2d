//! # Terrain Generation
//!
//! The terrain sampler decides which block occupies any world position. It is a pure
//! function of the seed, the position and the static biome configuration, so every
//! worker can sample any chunk without coordination.
//!
//! ## Algorithm
//!
//! For a voxel at `(x, y, z)`:
//! 1. Outside the world is air; the bottom layer is bedrock.
//! 2. **Biome selection**: each biome gets a 2-D noise weight for the column. The
//!    heaviest biome (first on ties) supplies blocks and flora. Every biome with a
//!    positive weighted height contributes to the mean column height, which is added
//!    to the solid ground height.
//! 3. **Basic terrain**: surface block at the terrain height, sub-surface block in the
//!    three layers below it, air above, stone deeper down.
//! 4. **Lodes**: stone inside a lode's height band is replaced where the lode's 3-D
//!    noise exceeds its threshold. Lodes run in order and the last hit wins.
//! 5. **Major flora** (population only): at the terrain height, two 2-D noise gates
//!    decide whether a structure grows. The structure comes back as modifications.
//!
//! ## Performance Considerations
//!
//! Steps 1-2 depend only on the column, so [`TerrainSampler::sample_column`] is computed
//! once per `(x, z)` when populating a whole chunk and reused for every `y`.

use cgmath::Point3;

use self::biome::TerrainSettings;
use self::noise::{CoherentNoise, NoiseField};

use super::block::{BlockId, AIR, BEDROCK, STONE};
use super::chunk::{ChunkCoord, ChunkStore, VoxelState};
use super::voxel_mod::VoxelMod;
use super::WorldDimensions;

pub mod biome;
pub mod noise;
pub mod structure;

/// Column-level terrain facts shared by every voxel in the column.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ColumnSample {
    /// Y of the surface voxel
    pub terrain_height: i32,
    /// Index of the strongest biome
    pub biome_index: usize,
}

/// Index of the heaviest weight. The first biome wins ties, and a column where no
/// weight is positive falls back to biome 0.
fn strongest_biome(weights: &[f64]) -> usize {
    let mut strongest_weight = 0.0;
    let mut strongest_index = 0;
    for (index, weight) in weights.iter().enumerate() {
        if *weight > strongest_weight {
            strongest_weight = *weight;
            strongest_index = index;
        }
    }
    strongest_index
}

/// Deterministic terrain sampler for one world.
pub struct TerrainSampler {
    noise: NoiseField,
    terrain: TerrainSettings,
    dimensions: WorldDimensions,
}

impl TerrainSampler {
    /// Creates a sampler.
    ///
    /// # Arguments
    /// * `seed` - World seed, mixed into every noise lookup
    /// * `terrain` - Biome and lode configuration
    /// * `dimensions` - Chunk and world sizes
    /// * `source` - The coherent noise to sample
    pub fn new(
        seed: i32,
        terrain: TerrainSettings,
        dimensions: WorldDimensions,
        source: Box<dyn CoherentNoise>,
    ) -> Self {
        TerrainSampler {
            noise: NoiseField::new(source, seed, dimensions.chunk_width),
            terrain,
            dimensions,
        }
    }

    /// The seeded noise used by this sampler.
    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    /// World and chunk sizes.
    pub fn dimensions(&self) -> WorldDimensions {
        self.dimensions
    }

    /// The biome configuration.
    pub fn terrain(&self) -> &TerrainSettings {
        &self.terrain
    }

    /// Runs the biome selection pass for the column at `(x, z)`.
    pub fn sample_column(&self, x: i32, z: i32) -> ColumnSample {
        let (fx, fz) = (x as f64, z as f64);
        let weights = self.biome_weights(fx, fz);
        let mut sum_of_heights = 0.0;
        let mut count = 0;

        for (biome, weight) in self.terrain.biomes.iter().zip(&weights) {
            let height = self.noise.get_2d(fx, fz, 0.0, biome.terrain_scale)
                * biome.terrain_height
                * weight;
            if height > 0.0 {
                sum_of_heights += height;
                count += 1;
            }
        }

        let mean_height = if count > 0 {
            sum_of_heights / count as f64
        } else {
            0.0
        };

        ColumnSample {
            terrain_height: (mean_height + self.terrain.solid_ground_height as f64).floor() as i32,
            biome_index: strongest_biome(&weights),
        }
    }

    /// Noise weight of every biome for the column at `(x, z)`, in biome order.
    fn biome_weights(&self, x: f64, z: f64) -> Vec<f64> {
        self.terrain
            .biomes
            .iter()
            .map(|biome| self.noise.get_2d(x, z, biome.offset, biome.scale))
            .collect()
    }

    /// The block at `position`. Pure: never produces structures.
    pub fn get_voxel(&self, position: Point3<i32>) -> BlockId {
        if !self.dimensions.contains_voxel(position) {
            return AIR;
        }
        if position.y == 0 {
            return BEDROCK;
        }
        let column = self.sample_column(position.x, position.z);
        self.voxel_in_column(position, &column)
    }

    /// Index of the strongest biome at `position`'s column.
    pub fn biome_index(&self, position: Point3<i32>) -> usize {
        strongest_biome(&self.biome_weights(position.x as f64, position.z as f64))
    }

    /// The block at `position` given its precomputed column.
    pub fn voxel_in_column(&self, position: Point3<i32>, column: &ColumnSample) -> BlockId {
        if !self.dimensions.contains_voxel(position) {
            return AIR;
        }
        let y = position.y;
        if y == 0 {
            return BEDROCK;
        }

        let height = column.terrain_height;
        let Some(biome) = self.terrain.biomes.get(column.biome_index) else {
            return if y <= height { STONE } else { AIR };
        };

        let voxel = if y == height {
            biome.surface_block
        } else if y < height && y > height - 4 {
            biome.sub_surface_block
        } else if y > height {
            return AIR;
        } else {
            STONE
        };

        if voxel != STONE {
            return voxel;
        }

        let sample_position = Point3::new(position.x as f64, y as f64, position.z as f64);
        biome
            .lodes
            .iter()
            .filter(|lode| y > lode.min_height && y < lode.max_height)
            .filter(|lode| {
                self.noise
                    .get_3d(sample_position, lode.noise_offset, lode.scale, lode.threshold)
            })
            .last()
            .map_or(STONE, |lode| lode.block_id)
    }

    /// Like [`TerrainSampler::voxel_in_column`], and also runs the major flora pass.
    ///
    /// Structures that grow from this voxel are appended to `structures`, one entry per
    /// structure.
    pub fn populate_voxel(
        &self,
        position: Point3<i32>,
        column: &ColumnSample,
        structures: &mut Vec<Vec<VoxelMod>>,
    ) -> BlockId {
        let voxel = self.voxel_in_column(position, column);

        if position.y != column.terrain_height || !self.dimensions.contains_voxel(position) {
            return voxel;
        }
        let Some(biome) = self.terrain.biomes.get(column.biome_index) else {
            return voxel;
        };
        if !biome.place_major_flora {
            return voxel;
        }

        let (fx, fz) = (position.x as f64, position.z as f64);
        if self.noise.get_2d(fx, fz, 0.0, biome.major_flora_zone_scale)
            > biome.major_flora_zone_threshold
            && self.noise.get_2d(fx, fz, 0.0, biome.major_flora_placement_scale)
                > biome.major_flora_placement_threshold
        {
            structures.push(structure::generate_major_flora(
                biome.major_flora,
                position,
                biome.min_major_flora_height,
                biome.max_major_flora_height,
                &self.noise,
            ));
        }

        voxel
    }

    /// Fills a fresh store for `coord` from the sampler.
    ///
    /// # Returns
    /// The populated store (light not yet computed) and the structures that grew in it.
    pub fn populate_chunk(&self, coord: ChunkCoord) -> (ChunkStore, Vec<Vec<VoxelMod>>) {
        let width = self.dimensions.chunk_width;
        let height = self.dimensions.chunk_height;
        let mut store = ChunkStore::new(coord, width, height);
        let mut structures = Vec::new();
        let origin = coord.world_origin(width);

        for z in 0..width {
            for x in 0..width {
                let world_x = origin.x + x as i32;
                let world_z = origin.z + z as i32;
                let column = self.sample_column(world_x, world_z);

                for y in 0..height {
                    let position = Point3::new(world_x, y as i32, world_z);
                    let id = self.populate_voxel(position, &column, &mut structures);
                    let index = store.index(x, y, z);
                    store.voxels_mut()[index] = VoxelState::new(id);
                }
            }
        }

        (store, structures)
    }
}

#[cfg(test)]
mod tests {
    use super::biome::BiomeAttributes;
    use super::noise::{FlatNoise, PerlinNoise};
    use super::*;

    fn dimensions() -> WorldDimensions {
        WorldDimensions {
            chunk_width: 16,
            chunk_height: 128,
            world_size_in_chunks: 100,
        }
    }

    fn perlin_sampler(seed: i32) -> TerrainSampler {
        TerrainSampler::new(
            seed,
            TerrainSettings::default(),
            dimensions(),
            Box::new(PerlinNoise::new(seed as u32)),
        )
    }

    fn flat_sampler() -> TerrainSampler {
        let mut terrain = TerrainSettings::default();
        let biome: &mut BiomeAttributes = &mut terrain.biomes[0];
        biome.offset = 0.0;
        biome.scale = 0.005;
        terrain.solid_ground_height = 42;
        TerrainSampler::new(42, terrain, dimensions(), Box::new(FlatNoise(0.0)))
    }

    fn random_position() -> Point3<i32> {
        Point3::new(fastrand::i32(0..1600), fastrand::i32(0..128), fastrand::i32(0..1600))
    }

    #[test]
    fn sampling_is_deterministic() {
        let first = perlin_sampler(1234);
        let second = perlin_sampler(1234);
        for _ in 0..300 {
            let position = random_position();
            assert_eq!(first.get_voxel(position), first.get_voxel(position));
            assert_eq!(first.get_voxel(position), second.get_voxel(position));
            assert_eq!(first.biome_index(position), second.biome_index(position));
        }
    }

    #[test]
    fn bounds_and_bedrock() {
        let sampler = perlin_sampler(99);
        for _ in 0..100 {
            let position = random_position();
            assert_eq!(sampler.get_voxel(Point3::new(position.x, 0, position.z)), BEDROCK);
        }
        assert_eq!(sampler.get_voxel(Point3::new(-1, 10, 5)), AIR);
        assert_eq!(sampler.get_voxel(Point3::new(5, 10, 1600)), AIR);
        assert_eq!(sampler.get_voxel(Point3::new(5, 128, 5)), AIR);
        assert_eq!(sampler.get_voxel(Point3::new(5, -1, 5)), AIR);
    }

    #[test]
    fn flat_noise_produces_flat_terrain_at_solid_ground() {
        let sampler = flat_sampler();
        for _ in 0..20 {
            let position = random_position();
            let (x, z) = (position.x, position.z);
            assert_eq!(sampler.sample_column(x, z).terrain_height, 42);
            assert_eq!(sampler.get_voxel(Point3::new(x, 42, z)), 3);
            for y in 39..=41 {
                assert_eq!(sampler.get_voxel(Point3::new(x, y, z)), 6);
            }
            assert_eq!(sampler.get_voxel(Point3::new(x, 38, z)), STONE);
            assert_eq!(sampler.get_voxel(Point3::new(x, 43, z)), AIR);
            assert_eq!(sampler.get_voxel(Point3::new(x, 100, z)), AIR);
        }
    }

    #[test]
    fn first_biome_wins_ties() {
        assert_eq!(strongest_biome(&[0.4, 0.7, 0.7]), 1);
        assert_eq!(strongest_biome(&[0.0, 0.0]), 0);

        let sampler = TerrainSampler::new(
            5,
            TerrainSettings::default(),
            dimensions(),
            Box::new(FlatNoise(0.5)),
        );
        let position = Point3::new(100, 50, 100);
        assert_eq!(sampler.biome_index(position), 0);
        assert_eq!(sampler.sample_column(100, 100).biome_index, 0);
    }

    #[test]
    fn later_lodes_win() {
        let mut terrain = TerrainSettings::default();
        for biome in &mut terrain.biomes {
            for (i, lode) in biome.lodes.iter_mut().enumerate() {
                lode.block_id = 20 + i as BlockId;
                lode.min_height = 0;
                lode.max_height = 128;
                lode.threshold = 0.1;
            }
        }
        let sampler = TerrainSampler::new(1, terrain, dimensions(), Box::new(FlatNoise(0.5)));
        assert_eq!(sampler.get_voxel(Point3::new(3, 10, 3)), 22);
    }

    #[test]
    fn populated_chunk_matches_pointwise_sampling() {
        let sampler = perlin_sampler(7);
        let coord = ChunkCoord::new(40, 41);
        let (store, _) = sampler.populate_chunk(coord);
        for _ in 0..500 {
            let index = fastrand::usize(0..store.volume());
            let local = store.position_of(index);
            let local = Point3::new(local.x as i32, local.y as i32, local.z as i32);
            let world = store.local_to_world(local);
            assert_eq!(store.voxels()[index].id, sampler.get_voxel(world));
        }
    }

    #[test]
    fn flora_is_reported_only_by_population() {
        let mut terrain = TerrainSettings::default();
        for biome in &mut terrain.biomes {
            biome.major_flora_zone_threshold = 0.1;
            biome.major_flora_placement_threshold = 0.1;
        }
        let sampler = TerrainSampler::new(3, terrain, dimensions(), Box::new(FlatNoise(0.5)));
        let (_, structures) = sampler.populate_chunk(ChunkCoord::new(1, 1));
        assert_eq!(structures.len(), 16 * 16);
        assert!(structures.iter().all(|mods| !mods.is_empty()));
    }
}
