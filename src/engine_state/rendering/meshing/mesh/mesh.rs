//! Mesh payload handed to the renderer.
//!
//! A chunk mesh shares one vertex stream between two index lists: opaque triangles
//! drawn first, transparent triangles drawn second.

use crate::engine_state::rendering::texture::TextureAtlas;
use crate::engine_state::voxels::chunk::ChunkCoord;

use super::face::Face;

/// Per-chunk geometry, in chunk-local space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkMesh {
    /// The chunk this mesh was built for
    pub coord: ChunkCoord,
    /// Vertex positions, four per quad
    pub vertices: Vec<[f32; 3]>,
    /// Triangle indices for the opaque pass
    pub opaque_triangles: Vec<u32>,
    /// Triangle indices for the transparent pass
    pub transparent_triangles: Vec<u32>,
    /// Atlas UVs, one per vertex
    pub uvs: Vec<[f32; 2]>,
    /// Vertex colors; alpha carries the baked light level
    pub colors: Vec<[f32; 4]>,
    /// Vertex normals
    pub normals: Vec<[f32; 3]>,
}

impl ChunkMesh {
    /// Creates an empty mesh for `coord`.
    pub fn new(coord: ChunkCoord) -> Self {
        ChunkMesh {
            coord,
            ..Default::default()
        }
    }

    /// Appends one quad.
    ///
    /// # Arguments
    /// * `face` - The face to emit
    /// * `atlas` - Atlas used to resolve the face's texture cell
    pub fn add_face(&mut self, face: &Face, atlas: &TextureAtlas) {
        let vertex_index = self.vertices.len() as u32;

        self.vertices.extend_from_slice(&face.vertices());
        self.uvs.extend_from_slice(&atlas.uvs(face.texture));
        self.colors.extend([[0.0, 0.0, 0.0, face.light]; 4]);
        self.normals.extend([face.side.normal(); 4]);

        let triangles = if face.transparent {
            &mut self.transparent_triangles
        } else {
            &mut self.opaque_triangles
        };
        triangles.extend_from_slice(&[
            vertex_index,
            vertex_index + 1,
            vertex_index + 2,
            vertex_index + 2,
            vertex_index + 1,
            vertex_index + 3,
        ]);
    }

    /// Number of quads in the mesh.
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Returns true if the mesh has no geometry.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertex positions as raw bytes for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Opaque indices as raw bytes for upload.
    pub fn opaque_index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.opaque_triangles)
    }

    /// Transparent indices as raw bytes for upload.
    pub fn transparent_index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.transparent_triangles)
    }

    /// UVs as raw bytes for upload.
    pub fn uv_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uvs)
    }

    /// Colors as raw bytes for upload.
    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }

    /// Normals as raw bytes for upload.
    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }
}
