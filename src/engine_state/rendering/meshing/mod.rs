//! Mesh generation for voxel chunks.
//!
//! This module turns a populated chunk store into renderable geometry. Every solid
//! voxel emits one quad per side whose neighbour is a block it is drawn against (air,
//! glass, leaves, or anything else flagged `render_neighbor_faces`). Neighbours across
//! the chunk edge are read through a [`VoxelAccessor`], normally a
//! [`NeighborSnapshot`] captured before the chunk's own store is locked.
//!
//! # Architecture
//! - `build_chunk_mesh`: face culling and quad emission
//! - `light`: column pass plus flood fill, run before meshing
//! - `neighbor_snapshot`: copies of the four adjacent edge planes
//! - `mesh/`: the [`ChunkMesh`] payload and [`Face`]
//!
//! # Performance Considerations
//! - One pass over the store in storage order
//! - Cross-chunk reads hit a flat copied plane, never another chunk's lock

use cgmath::Point3;

use crate::engine_state::voxels::block::block_side::BlockSide;
use crate::engine_state::voxels::block::BlockCatalog;
use crate::engine_state::voxels::chunk::{ChunkStore, VoxelLookup, VoxelState};

use super::texture::TextureAtlas;

pub mod light;
mod mesh;
pub mod neighbor_snapshot;

pub use mesh::{ChunkMesh, Face};
pub use neighbor_snapshot::NeighborSnapshot;

/// Read access to voxels outside the chunk being meshed.
pub trait VoxelAccessor {
    /// The voxel at a world position next to the chunk.
    fn voxel_at(&self, position: Point3<i32>) -> VoxelState;
}

/// Treats everything outside the chunk as lit air.
pub struct OpenAir;

impl VoxelAccessor for OpenAir {
    fn voxel_at(&self, _position: Point3<i32>) -> VoxelState {
        VoxelState::open_air()
    }
}

/// Builds the mesh of one chunk.
///
/// # Arguments
/// * `store` - The chunk's voxels, already lit
/// * `catalog` - Block properties
/// * `neighbors` - Voxels across the chunk's vertical faces
/// * `atlas` - Texture atlas used for UVs
///
/// # Returns
/// The chunk's geometry; opaque and transparent faces go to separate index lists.
pub fn build_chunk_mesh(
    store: &ChunkStore,
    catalog: &BlockCatalog,
    neighbors: &dyn VoxelAccessor,
    atlas: &TextureAtlas,
) -> ChunkMesh {
    let mut mesh = ChunkMesh::new(store.coord());

    for (position, voxel) in store.iter() {
        let block = catalog.get(voxel.id);
        if !block.is_solid {
            continue;
        }

        let local = Point3::new(position.x as i32, position.y as i32, position.z as i32);
        for side in BlockSide::all() {
            let neighbor = match store.lookup(local + side.offset()) {
                VoxelLookup::Local(voxel) => *voxel,
                VoxelLookup::Neighbor(world_position) => neighbors.voxel_at(world_position),
                VoxelLookup::OutOfWorld => VoxelState::open_air(),
            };

            if !catalog.get(neighbor.id).render_neighbor_faces {
                continue;
            }

            let face = Face::new(
                position,
                side,
                block.textures.for_side(side),
                neighbor.light,
                block.render_neighbor_faces,
            );
            mesh.add_face(&face, atlas);
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::{AIR, LEAVES, STONE};
    use crate::engine_state::voxels::chunk::ChunkCoord;

    fn random_store() -> ChunkStore {
        let mut store = ChunkStore::new(ChunkCoord::new(0, 0), 6, 10);
        let ids = [AIR, AIR, STONE, 3, LEAVES, 12];
        for index in 0..store.volume() {
            store.voxels_mut()[index].id = ids[fastrand::usize(0..ids.len())];
        }
        store
    }

    fn exposed_pairs(store: &ChunkStore, catalog: &BlockCatalog) -> usize {
        let mut count = 0;
        for (position, voxel) in store.iter() {
            if !catalog.is_solid(voxel.id) {
                continue;
            }
            for side in BlockSide::all() {
                let offset = side.offset();
                let neighbor = Point3::new(
                    position.x as i32 + offset.x,
                    position.y as i32 + offset.y,
                    position.z as i32 + offset.z,
                );
                let neighbor_id = store.get(neighbor).map_or(AIR, |voxel| voxel.id);
                if catalog.get(neighbor_id).render_neighbor_faces {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn single_block_emits_six_quads() {
        let catalog = BlockCatalog::default();
        let mut store = ChunkStore::new(ChunkCoord::new(0, 0), 4, 4);
        store.set_id(Point3::new(1, 1, 1), STONE);

        let mesh = build_chunk_mesh(&store, &catalog, &OpenAir, &TextureAtlas::default());
        assert_eq!(mesh.quad_count(), 6);
        assert_eq!(mesh.opaque_triangles.len(), 36);
        assert!(mesh.transparent_triangles.is_empty());
    }

    #[test]
    fn quads_match_exposed_faces() {
        let catalog = BlockCatalog::default();
        let atlas = TextureAtlas::default();
        for _ in 0..10 {
            let mut store = random_store();
            light::recalculate_light(&mut store, &catalog, 0.08);
            let mesh = build_chunk_mesh(&store, &catalog, &OpenAir, &atlas);

            assert_eq!(mesh.quad_count(), exposed_pairs(&store, &catalog));
            assert_eq!(
                mesh.opaque_triangles.len() + mesh.transparent_triangles.len(),
                mesh.quad_count() * 6
            );
            assert_eq!(mesh.uvs.len(), mesh.vertices.len());
            assert_eq!(mesh.colors.len(), mesh.vertices.len());
            assert_eq!(mesh.normals.len(), mesh.vertices.len());
        }
    }

    #[test]
    fn buried_blocks_emit_nothing() {
        let catalog = BlockCatalog::default();
        let mut store = ChunkStore::new(ChunkCoord::new(0, 0), 3, 3);
        for voxel in store.voxels_mut() {
            voxel.id = STONE;
        }

        let solid_neighbors = |_position: Point3<i32>| VoxelState::new(STONE);
        struct Solid<F: Fn(Point3<i32>) -> VoxelState>(F);
        impl<F: Fn(Point3<i32>) -> VoxelState> VoxelAccessor for Solid<F> {
            fn voxel_at(&self, position: Point3<i32>) -> VoxelState {
                (self.0)(position)
            }
        }

        let atlas = TextureAtlas::default();
        let mesh = build_chunk_mesh(&store, &catalog, &Solid(solid_neighbors), &atlas);
        // only the top and bottom of the world stay open
        assert_eq!(mesh.quad_count(), 9 * 2);
    }
}
