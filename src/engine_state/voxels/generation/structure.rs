//! # Structures
//!
//! Multi-voxel features placed on the terrain surface. A structure is never written
//! into a store directly: generation returns the modifications and the orchestrator
//! routes them to whichever chunks own the target voxels.

use cgmath::Point3;
use serde::{Deserialize, Serialize};

use super::noise::NoiseField;
use crate::engine_state::voxels::block::{CACTUS, LEAVES, WOOD};
use crate::engine_state::voxels::voxel_mod::VoxelMod;

/// The kinds of major flora a biome can place.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MajorFlora {
    /// A wooden trunk topped with a leaf canopy
    Tree,
    /// A single cactus column
    Cactus,
}

/// Generates the structure `kind` standing on the voxel at `ground`.
///
/// # Arguments
/// * `kind` - Which structure to build
/// * `ground` - World position of the surface voxel the structure stands on
/// * `min_height` / `max_height` - Bounds for the noise-derived trunk height
/// * `noise` - The world's seeded noise
///
/// # Returns
/// The modifications making up the structure, trunk first.
pub fn generate_major_flora(
    kind: MajorFlora,
    ground: Point3<i32>,
    min_height: i32,
    max_height: i32,
    noise: &NoiseField,
) -> Vec<VoxelMod> {
    match kind {
        MajorFlora::Tree => make_tree(ground, min_height, max_height, noise),
        MajorFlora::Cactus => make_cactus(ground, min_height, max_height, noise),
    }
}

fn make_tree(
    ground: Point3<i32>,
    min_height: i32,
    max_height: i32,
    noise: &NoiseField,
) -> Vec<VoxelMod> {
    let base = Point3::new(ground.x, ground.y + 1, ground.z);
    let spread = noise.get_2d(base.x as f64, base.z as f64, 250.0, 3.0);
    let height = min_height + ((max_height - min_height) as f64 * spread) as i32;

    let mut mods: Vec<VoxelMod> = (0..height)
        .map(|i| VoxelMod::new(Point3::new(base.x, base.y + i, base.z), WOOD))
        .collect();

    for x in -2..=2_i32 {
        for y in -3..=0_i32 {
            for z in -2..=2_i32 {
                // the trunk occupies the centre column below the crown
                if y < 0 && x == 0 && z == 0 {
                    continue;
                }
                let skip = match y {
                    -1 => x.abs() > 1 || z.abs() > 1,
                    0 => x.abs() + z.abs() > 1,
                    _ => x.abs() + z.abs() > 3,
                };
                if skip {
                    continue;
                }
                mods.push(VoxelMod::new(
                    Point3::new(base.x + x, base.y + height + y, base.z + z),
                    LEAVES,
                ));
            }
        }
    }

    mods
}

fn make_cactus(
    ground: Point3<i32>,
    min_height: i32,
    max_height: i32,
    noise: &NoiseField,
) -> Vec<VoxelMod> {
    let base = Point3::new(ground.x, ground.y + 1, ground.z);
    let spread = noise.get_2d(base.x as f64, base.z as f64, 23456.0, 2.0);
    let height = ((max_height as f64 * spread) as i32).max(min_height);

    (0..height)
        .map(|i| VoxelMod::new(Point3::new(base.x, base.y + i, base.z), CACTUS))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::generation::noise::FlatNoise;

    fn flat(value: f64) -> NoiseField {
        NoiseField::new(Box::new(FlatNoise(value)), 0, 16)
    }

    #[test]
    fn tree_has_trunk_and_canopy() {
        let ground = Point3::new(10, 40, 10);
        let mods = generate_major_flora(MajorFlora::Tree, ground, 4, 8, &flat(0.5));

        let trunk: Vec<_> = mods.iter().filter(|m| m.id == WOOD).collect();
        assert_eq!(trunk.len(), 6);
        assert!(trunk
            .iter()
            .all(|m| m.position.x == 10 && m.position.z == 10 && m.position.y > 40));

        let leaves: Vec<_> = mods.iter().filter(|m| m.id == LEAVES).collect();
        // two clipped 5x5 layers around the trunk, a 3x3 ring, a plus on top
        assert_eq!(leaves.len(), 20 + 20 + 8 + 5);
        let crown = ground.y + 1 + 6;
        assert!(leaves.iter().all(|m| m.position.y <= crown && m.position.y >= crown - 3));
        assert!(leaves
            .iter()
            .all(|m| !(m.position.x == 10 && m.position.z == 10 && m.position.y < crown)));
    }

    #[test]
    fn cactus_respects_minimum_height() {
        let ground = Point3::new(0, 30, 0);
        let mods = generate_major_flora(MajorFlora::Cactus, ground, 2, 4, &flat(0.0));
        assert_eq!(mods.len(), 2);
        assert!(mods.iter().all(|m| m.id == CACTUS));
        assert_eq!(mods[0].position, Point3::new(0, 31, 0));
    }
}
