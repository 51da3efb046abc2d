//! Binary chunk record.
//!
//! ```text
//! offset  size  field
//! 0       4     magic "VXCK"
//! 4       2     version (1)
//! 6       2     chunk width
//! 8       2     chunk height
//! 10      4     chunk x
//! 14      4     chunk z
//! 18      4     voxel count
//! 22      5*n   voxels: id u8, light f32
//! 22+5n   4     CRC-32 of every preceding byte
//! ```
//!
//! All integers are little-endian. Voxels follow the store's own order,
//! `x + width * (z + width * y)`.

use std::io::{Cursor, Read};

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};

use crate::engine_state::voxels::chunk::{ChunkCoord, ChunkStore, VoxelState};

use super::error::RecordError;

/// First four bytes of every chunk record.
pub const CHUNK_MAGIC: [u8; 4] = *b"VXCK";
/// Record format written by this version.
pub const CHUNK_RECORD_VERSION: u16 = 1;

const HEADER_LEN: usize = 22;
const VOXEL_LEN: usize = 5;
const CHECKSUM_LEN: usize = 4;

/// Encodes a store as a chunk record.
pub fn encode_chunk_record(store: &ChunkStore) -> Vec<u8> {
    let count = store.volume();
    let mut bytes = vec![0u8; HEADER_LEN + count * VOXEL_LEN + CHECKSUM_LEN];

    bytes[0..4].copy_from_slice(&CHUNK_MAGIC);
    LittleEndian::write_u16(&mut bytes[4..6], CHUNK_RECORD_VERSION);
    LittleEndian::write_u16(&mut bytes[6..8], store.width() as u16);
    LittleEndian::write_u16(&mut bytes[8..10], store.height() as u16);
    LittleEndian::write_i32(&mut bytes[10..14], store.coord().x);
    LittleEndian::write_i32(&mut bytes[14..18], store.coord().z);
    LittleEndian::write_u32(&mut bytes[18..22], count as u32);

    let mut offset = HEADER_LEN;
    for voxel in store.voxels() {
        bytes[offset] = voxel.id;
        LittleEndian::write_f32(&mut bytes[offset + 1..offset + VOXEL_LEN], voxel.light);
        offset += VOXEL_LEN;
    }

    let checksum = crc32fast::hash(&bytes[..offset]);
    LittleEndian::write_u32(&mut bytes[offset..], checksum);
    bytes
}

/// Decodes a chunk record, checking it against the expected chunk and dimensions.
pub fn decode_chunk_record(
    bytes: &[u8],
    expected: ChunkCoord,
    width: usize,
    height: usize,
) -> Result<ChunkStore, RecordError> {
    if bytes.len() < CHUNK_MAGIC.len() {
        return Err(RecordError::Truncated);
    }
    if bytes[..4] != CHUNK_MAGIC {
        return Err(RecordError::BadMagic);
    }

    let mut cursor = Cursor::new(&bytes[4..]);
    let version = read(cursor.read_u16::<LittleEndian>())?;
    if version != CHUNK_RECORD_VERSION {
        return Err(RecordError::UnsupportedVersion(version));
    }

    let found_width = read(cursor.read_u16::<LittleEndian>())? as usize;
    let found_height = read(cursor.read_u16::<LittleEndian>())? as usize;
    let found = ChunkCoord::new(
        read(cursor.read_i32::<LittleEndian>())?,
        read(cursor.read_i32::<LittleEndian>())?,
    );
    let count = read(cursor.read_u32::<LittleEndian>())? as usize;

    let body_end = HEADER_LEN + count * VOXEL_LEN;
    if bytes.len() < body_end + CHECKSUM_LEN {
        return Err(RecordError::Truncated);
    }
    let stored_checksum = LittleEndian::read_u32(&bytes[body_end..body_end + CHECKSUM_LEN]);
    if crc32fast::hash(&bytes[..body_end]) != stored_checksum {
        return Err(RecordError::ChecksumMismatch);
    }

    if found_width != width || found_height != height || count != width * width * height {
        return Err(RecordError::DimensionMismatch {
            width,
            height,
            found_width,
            found_height,
        });
    }
    if found != expected {
        return Err(RecordError::CoordinateMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        });
    }

    let mut voxels = Vec::with_capacity(count);
    let mut body = Cursor::new(&bytes[HEADER_LEN..body_end]);
    let mut id = [0u8; 1];
    for _ in 0..count {
        read(body.read_exact(&mut id))?;
        let light = read(body.read_f32::<LittleEndian>())?;
        voxels.push(VoxelState { id: id[0], light });
    }

    ChunkStore::from_voxels(expected, width, height, voxels).ok_or(RecordError::Truncated)
}

fn read<T>(result: std::io::Result<T>) -> Result<T, RecordError> {
    result.map_err(|_| RecordError::Truncated)
}
