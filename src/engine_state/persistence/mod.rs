//! # Persistence
//!
//! Durable storage for worlds and edited chunks. A world is a small JSON descriptor
//! holding its name and seed; each chunk edited after population is written as a
//! versioned, checksummed binary record keyed by its coordinate.
//!
//! Loading is layered: the in-memory [`WorldData`] map first, then the chunk file,
//! and only then the terrain sampler. A missing file is a cache miss; a file that
//! exists but does not decode is a [`PersistenceError`].
//!
//! Saving is incremental: only chunks in the modified set are written, and the set is
//! cleared as each write succeeds.

pub mod chunk_record;
pub mod error;
pub mod save_system;
pub mod world_data;

pub use error::{PersistenceError, RecordError};
pub use save_system::{SaveReport, SaveSystem};
pub use world_data::{ChunkData, WorldData, WorldDescriptor};
