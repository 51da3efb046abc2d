//! # Core Module
//!
//! This module provides the concurrency primitives shared by the world orchestrator and
//! its background workers.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource with read-write locking
//! - `SharedQueue`: Mutex-guarded FIFO used for every cross-thread work list
//!
//! ## Usage
//! ```ignore
//! use voxel_world::core::{MtResource, SharedQueue};
//!
//! // Thread-safe resource
//! let counter = MtResource::new(0);
//! *counter.get_mut() += 1;
//! assert_eq!(*counter.get(), 1);
//!
//! // Guarded work queue
//! let queue = SharedQueue::new();
//! queue.push_back_unique("chunk");
//! assert_eq!(queue.len(), 1);
//! ```

pub mod mt_resource;
pub mod shared_queue;

pub use mt_resource::MtResource;
pub use shared_queue::SharedQueue;
