//! Edge planes of the four horizontal neighbours of a chunk.
//!
//! A mesh build needs one voxel layer from each adjacent chunk. Those layers are
//! copied up front, taking each neighbour's read lock once and releasing it before
//! the next, so a build never holds two chunk locks at the same time. Neighbours that
//! are not editable yet are sampled straight from the terrain generator instead.

use cgmath::Point3;

use crate::engine_state::voxels::block::{BlockCatalog, AIR};
use crate::engine_state::voxels::chunk::{ChunkCoord, ChunkStore, VoxelState};
use crate::engine_state::voxels::generation::TerrainSampler;
use crate::engine_state::voxels::world::World;

use super::VoxelAccessor;

/// One `height × width` voxel layer, indexed `y * width + t` where `t` runs along the
/// shared edge.
type EdgePlane = Vec<VoxelState>;

/// Copies of the layers bordering a chunk, in [`ChunkCoord::neighbors`] order.
pub struct NeighborSnapshot {
    coord: ChunkCoord,
    width: usize,
    height: usize,
    planes: [Option<EdgePlane>; 4],
}

impl NeighborSnapshot {
    /// Captures the edge layers around `coord`.
    pub fn capture(world: &World, coord: ChunkCoord) -> Self {
        let dimensions = world.dimensions();
        let width = dimensions.chunk_width;
        let height = dimensions.chunk_height;
        let mut planes: [Option<EdgePlane>; 4] = Default::default();

        for (slot, neighbor) in coord.neighbors().into_iter().enumerate() {
            if !dimensions.contains_chunk(neighbor) {
                continue;
            }

            let copied = world
                .editable_chunk_data(neighbor)
                .map(|data| copy_plane(&data.map.get(), slot));
            planes[slot] = Some(copied.unwrap_or_else(|| {
                sample_plane(world.sampler(), world.catalog(), neighbor, slot, width, height)
            }));
        }

        NeighborSnapshot {
            coord,
            width,
            height,
            planes,
        }
    }

    /// A snapshot with no neighbour data; every lookup reads as open air.
    pub fn empty(coord: ChunkCoord, width: usize, height: usize) -> Self {
        NeighborSnapshot {
            coord,
            width,
            height,
            planes: Default::default(),
        }
    }

    /// Maps a world position to `(slot, t)` if it lies in one of the edge layers.
    fn locate(&self, position: Point3<i32>) -> Option<(usize, usize)> {
        let origin = self.coord.world_origin(self.width);
        let local_x = position.x - origin.x;
        let local_z = position.z - origin.z;
        let width = self.width as i32;
        let inside = |v: i32| (0..width).contains(&v);

        match (local_x, local_z) {
            (-1, z) if inside(z) => Some((0, z as usize)),
            (x, z) if x == width && inside(z) => Some((1, z as usize)),
            (x, -1) if inside(x) => Some((2, x as usize)),
            (x, z) if z == width && inside(x) => Some((3, x as usize)),
            _ => None,
        }
    }
}

impl VoxelAccessor for NeighborSnapshot {
    fn voxel_at(&self, position: Point3<i32>) -> VoxelState {
        if position.y < 0 || position.y >= self.height as i32 {
            return VoxelState::open_air();
        }
        self.locate(position)
            .and_then(|(slot, t)| {
                let plane = self.planes[slot].as_ref()?;
                plane.get(position.y as usize * self.width + t).copied()
            })
            .unwrap_or_else(VoxelState::open_air)
    }
}

/// Local `(x, z)` inside the neighbour for the layer that faces the meshed chunk.
fn plane_cell(slot: usize, t: usize, width: usize) -> (usize, usize) {
    match slot {
        0 => (width - 1, t),
        1 => (0, t),
        2 => (t, width - 1),
        _ => (t, 0),
    }
}

fn copy_plane(store: &ChunkStore, slot: usize) -> EdgePlane {
    let width = store.width();
    let mut plane = Vec::with_capacity(width * store.height());
    for y in 0..store.height() {
        for t in 0..width {
            let (x, z) = plane_cell(slot, t, width);
            plane.push(store.voxels()[store.index(x, y, z)]);
        }
    }
    plane
}

/// Generates a layer from the sampler with column-only lighting.
fn sample_plane(
    sampler: &TerrainSampler,
    catalog: &BlockCatalog,
    neighbor: ChunkCoord,
    slot: usize,
    width: usize,
    height: usize,
) -> EdgePlane {
    let origin = neighbor.world_origin(width);
    let mut plane = vec![VoxelState::default(); width * height];

    for t in 0..width {
        let (x, z) = plane_cell(slot, t, width);
        let world_x = origin.x + x as i32;
        let world_z = origin.z + z as i32;
        let column = sampler.sample_column(world_x, world_z);

        let mut light_ray = 1.0_f32;
        for y in (0..height).rev() {
            let id = sampler.voxel_in_column(Point3::new(world_x, y as i32, world_z), &column);
            if id != AIR {
                light_ray = light_ray.min(catalog.get(id).transparency);
            }
            plane[y * width + t] = VoxelState { id, light: light_ray };
        }
    }

    plane
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::STONE;

    #[test]
    fn locates_each_edge() {
        let snapshot = NeighborSnapshot::empty(ChunkCoord::new(1, 1), 4, 8);
        assert_eq!(snapshot.locate(Point3::new(3, 0, 6)), Some((0, 2)));
        assert_eq!(snapshot.locate(Point3::new(8, 0, 5)), Some((1, 1)));
        assert_eq!(snapshot.locate(Point3::new(7, 0, 3)), Some((2, 3)));
        assert_eq!(snapshot.locate(Point3::new(4, 0, 8)), Some((3, 0)));
        // diagonal corners are never read by the mesher
        assert_eq!(snapshot.locate(Point3::new(3, 0, 3)), None);
        assert_eq!(snapshot.locate(Point3::new(5, 0, 5)), None);
    }

    #[test]
    fn copied_plane_faces_the_meshed_chunk() {
        let mut store = ChunkStore::new(ChunkCoord::new(0, 0), 4, 2);
        store.set_id(Point3::new(3, 1, 2), STONE);
        store.set_id(Point3::new(0, 1, 2), 5);

        let west = copy_plane(&store, 0);
        let east = copy_plane(&store, 1);
        assert_eq!(west[4 + 2].id, STONE);
        assert_eq!(east[4 + 2].id, 5);
        assert_eq!(west.iter().filter(|voxel| voxel.id != AIR).count(), 1);
    }

    #[test]
    fn missing_planes_read_as_open_air() {
        let snapshot = NeighborSnapshot::empty(ChunkCoord::new(0, 0), 4, 8);
        assert_eq!(snapshot.voxel_at(Point3::new(-1, 3, 0)), VoxelState::open_air());
        assert_eq!(snapshot.voxel_at(Point3::new(4, 9, 0)), VoxelState::open_air());
    }
}
