//! Texture atlas addressing.
//!
//! Block faces reference a cell of a square texture atlas by index. This module turns
//! those indices into normalized UV rectangles; loading the atlas image itself is the
//! renderer's job.

/// A square atlas of `size_in_blocks × size_in_blocks` equally sized cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TextureAtlas {
    size_in_blocks: u32,
}

impl TextureAtlas {
    /// Creates an atlas description. A size of zero is treated as one cell.
    pub fn new(size_in_blocks: u32) -> Self {
        TextureAtlas {
            size_in_blocks: size_in_blocks.max(1),
        }
    }

    /// Cells per atlas edge.
    pub fn size_in_blocks(&self) -> u32 {
        self.size_in_blocks
    }

    /// Edge length of one cell in UV space.
    pub fn normalized_block_size(&self) -> f32 {
        1.0 / self.size_in_blocks as f32
    }

    /// UVs for the four quad corners of cell `texture_id`.
    ///
    /// Cells are numbered row by row from the atlas's top-left corner while UV space
    /// starts at the bottom-left, so rows are flipped. Corner order is bottom-left,
    /// top-left, bottom-right, top-right, matching the face corner tables.
    pub fn uvs(&self, texture_id: u16) -> [[f32; 2]; 4] {
        let id = texture_id as u32;
        let row = id / self.size_in_blocks;
        let column = id % self.size_in_blocks;
        let n = self.normalized_block_size();

        let x = column as f32 * n;
        let y = 1.0 - row as f32 * n - n;

        [[x, y], [x, y + n], [x + n, y], [x + n, y + n]]
    }
}

impl Default for TextureAtlas {
    fn default() -> Self {
        TextureAtlas::new(16)
    }
}
