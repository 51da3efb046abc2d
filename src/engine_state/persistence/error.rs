//! Errors raised while reading and writing saved worlds.

use std::path::PathBuf;

/// Why a chunk record could not be decoded.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The first four bytes are not the chunk magic
    #[error("record does not start with the chunk magic")]
    BadMagic,
    /// The record was written by a newer format
    #[error("chunk record version {0} is not supported")]
    UnsupportedVersion(u16),
    /// The record was written with other chunk dimensions
    #[error("record is {found_width}x{found_height}, expected {width}x{height}")]
    DimensionMismatch {
        /// Configured chunk width
        width: usize,
        /// Configured chunk height
        height: usize,
        /// Width stored in the record
        found_width: usize,
        /// Height stored in the record
        found_height: usize,
    },
    /// The record belongs to another chunk
    #[error("record holds chunk {found}, expected {expected}")]
    CoordinateMismatch {
        /// The chunk being loaded
        expected: String,
        /// The chunk named in the record
        found: String,
    },
    /// The trailing CRC-32 does not match the contents
    #[error("checksum mismatch")]
    ChecksumMismatch,
    /// The record ends before its voxels or checksum
    #[error("record is truncated")]
    Truncated,
}

/// Failures of the save system. A missing file is never one of these.
#[derive(thiserror::Error, Debug)]
pub enum PersistenceError {
    /// Reading or writing a file failed
    #[error("I/O error on \"{}\": {source}", path.display())]
    Io {
        /// The file involved
        path: PathBuf,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },
    /// A chunk record exists but cannot be decoded
    #[error("corrupt chunk record \"{}\": {reason}", path.display())]
    CorruptChunk {
        /// The chunk file
        path: PathBuf,
        /// What is wrong with it
        reason: RecordError,
    },
    /// The world descriptor is not valid JSON for a descriptor
    #[error("unreadable world descriptor \"{}\": {source}", path.display())]
    CorruptWorld {
        /// The descriptor file
        path: PathBuf,
        /// The parse error
        #[source]
        source: serde_json::Error,
    },
    /// The world was written by a newer format
    #[error("world descriptor \"{}\" has unsupported format version {version}", path.display())]
    UnsupportedVersion {
        /// The descriptor file
        path: PathBuf,
        /// The version it declares
        version: u32,
    },
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PersistenceError::Io {
            path: path.into(),
            source,
        }
    }
}
