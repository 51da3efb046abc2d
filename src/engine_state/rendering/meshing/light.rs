//! Baked voxel lighting.
//!
//! Light is computed per chunk in two passes:
//!
//! 1. **Column pass**: every `(x, z)` column is swept top to bottom with a light ray
//!    starting at 1.0. Each non-air voxel clamps the ray to its block's transparency,
//!    so light never increases going down. Voxels left brighter than the falloff seed
//!    the propagation queue.
//! 2. **Flood fill**: a breadth-first pass spreads light sideways and upward. A
//!    neighbour dimmer than `current - falloff` is raised to that value and queued
//!    while it stays above the falloff.
//!
//! Every hop loses exactly `falloff`, so the fill terminates; the pop count is
//! returned so callers can observe the work done.

use std::collections::VecDeque;

use bitvec::prelude::*;
use cgmath::Point3;

use crate::engine_state::voxels::block::block_side::BlockSide;
use crate::engine_state::voxels::block::{BlockCatalog, AIR};
use crate::engine_state::voxels::chunk::ChunkStore;

/// Recomputes every light level in `store`.
///
/// # Arguments
/// * `store` - The chunk to relight; only in-chunk neighbours are considered
/// * `catalog` - Source of block transparency
/// * `falloff` - Light lost per propagation step, must be positive
///
/// # Returns
/// The number of voxels popped from the propagation queue.
pub fn recalculate_light(store: &mut ChunkStore, catalog: &BlockCatalog, falloff: f32) -> usize {
    debug_assert!(falloff > 0.0, "light falloff must be positive");

    let width = store.width();
    let height = store.height();
    let mut queue = VecDeque::new();
    let mut queued = bitvec![0; store.volume()];

    for z in 0..width {
        for x in 0..width {
            let mut light_ray = 1.0_f32;
            for y in (0..height).rev() {
                let index = store.index(x, y, z);
                let voxel = &mut store.voxels_mut()[index];

                if voxel.id != AIR {
                    let transparency = catalog.get(voxel.id).transparency;
                    if transparency < light_ray {
                        light_ray = transparency;
                    }
                }

                voxel.light = light_ray;
                if light_ray > falloff {
                    queue.push_back(index);
                    queued.set(index, true);
                }
            }
        }
    }

    let mut pops = 0;
    while let Some(index) = queue.pop_front() {
        pops += 1;
        queued.set(index, false);

        let spread = store.voxels()[index].light - falloff;
        let position = store.position_of(index);
        let position = Point3::new(position.x as i32, position.y as i32, position.z as i32);

        for side in BlockSide::all() {
            let neighbor = position + side.offset();
            if !store.contains(neighbor) {
                continue;
            }
            let neighbor_index =
                store.index(neighbor.x as usize, neighbor.y as usize, neighbor.z as usize);
            let voxel = &mut store.voxels_mut()[neighbor_index];

            if voxel.light < spread {
                voxel.light = spread;
                if spread > falloff && !queued[neighbor_index] {
                    queue.push_back(neighbor_index);
                    queued.set(neighbor_index, true);
                }
            }
        }
    }

    pops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::{LEAVES, STONE};
    use crate::engine_state::voxels::chunk::ChunkCoord;

    const FALLOFF: f32 = 0.08;

    fn terrain(width: usize, height: usize, surface: usize) -> ChunkStore {
        let mut store = ChunkStore::new(ChunkCoord::new(0, 0), width, height);
        for z in 0..width {
            for x in 0..width {
                for y in 0..=surface {
                    store.set_id(Point3::new(x as i32, y as i32, z as i32), STONE);
                }
            }
        }
        store
    }

    #[test]
    fn flat_terrain_darkens_with_depth() {
        let catalog = BlockCatalog::default();
        let mut store = terrain(8, 24, 10);
        recalculate_light(&mut store, &catalog, FALLOFF);

        for z in 0..8 {
            for x in 0..8 {
                let mut previous = f32::MAX;
                for y in (0..24).rev() {
                    let light = store.voxels()[store.index(x, y, z)].light;
                    assert!((0.0..=1.0).contains(&light));
                    assert!(light <= previous, "light rose going down at {x},{y},{z}");
                    previous = light;
                }
                let sky = store.voxels()[store.index(x, 11, z)].light;
                let surface = store.voxels()[store.index(x, 10, z)].light;
                assert_eq!(sky, 1.0);
                assert!((surface - (1.0 - FALLOFF)).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn light_spreads_under_an_overhang() {
        let catalog = BlockCatalog::default();
        let mut store = ChunkStore::new(ChunkCoord::new(0, 0), 8, 16);
        // a stone roof over the x < 4 half at y = 10
        for z in 0..8 {
            for x in 0..4 {
                store.set_id(Point3::new(x, 10, z), STONE);
            }
        }
        recalculate_light(&mut store, &catalog, FALLOFF);

        let open = store.voxels()[store.index(4, 5, 3)].light;
        let covered = store.voxels()[store.index(3, 5, 3)].light;
        let deeper = store.voxels()[store.index(1, 5, 3)].light;
        assert_eq!(open, 1.0);
        assert!((covered - (1.0 - FALLOFF)).abs() < 1e-6);
        assert!(deeper < covered && deeper > 0.0);
    }

    #[test]
    fn translucent_blocks_dim_the_column() {
        let catalog = BlockCatalog::default();
        let mut store = ChunkStore::new(ChunkCoord::new(0, 0), 1, 8);
        store.set_id(Point3::new(0, 5, 0), LEAVES);
        recalculate_light(&mut store, &catalog, FALLOFF);

        let transparency = catalog.get(LEAVES).transparency;
        assert_eq!(store.voxels()[store.index(0, 6, 0)].light, 1.0);
        let below = store.voxels()[store.index(0, 2, 0)].light;
        assert!(below < 1.0);
        assert!(below >= transparency);
    }

    #[test]
    fn propagation_is_bounded() {
        let catalog = BlockCatalog::default();
        for _ in 0..5 {
            let mut store = ChunkStore::new(ChunkCoord::new(0, 0), 8, 32);
            for _ in 0..400 {
                let position = Point3::new(
                    fastrand::i32(0..8),
                    fastrand::i32(0..32),
                    fastrand::i32(0..8),
                );
                store.set_id(position, STONE);
            }
            let pops = recalculate_light(&mut store, &catalog, FALLOFF);
            assert!(pops as f32 <= store.volume() as f32 / FALLOFF);
            assert!(store
                .voxels()
                .iter()
                .all(|voxel| (0.0..=1.0).contains(&voxel.light)));
        }
    }
}
