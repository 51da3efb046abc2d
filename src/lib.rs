#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! A deterministic, editable voxel world: procedural terrain, per-chunk light and
//! mesh generation, a chunk lifecycle driven by background workers, and incremental
//! persistence of edited chunks.
//!
//! ## Key Modules
//!
//! * `core` - Shared concurrency primitives used throughout the engine
//! * `engine_state` - The engine proper: voxels, rendering data, tasks, persistence
//!
//! ## Architecture
//!
//! The engine follows a modular architecture with clear separation between:
//! * Terrain sampling (pure functions of seed and position)
//! * Voxel storage, lighting and meshing
//! * The chunk lifecycle and its task scheduling
//! * Persistence
//!
//! Drawing is out of scope: the engine hands finished [`engine_state::rendering::ChunkMesh`]
//! buffers to whatever renderer consumes them.
//!
//! ## Usage
//!
//! ```ignore
//! fn main() {
//!     voxel_world::run();
//! }
//! ```
//!
//! ## Performance Considerations
//!
//! * Chunk-based voxel storage with flat, x-fastest arrays
//! * Column samples computed once per `(x, z)` during population
//! * Multi-threaded task execution for population, meshing and saving

use cgmath::Point3;
use log::{error, info};

use engine_state::settings::WorldSettings;
use engine_state::EngineState;

pub mod core;
pub mod engine_state;

/// Settings file read by [`run`].
pub const SETTINGS_FILE: &str = "settings.json";

/// Upper bound on frames spent pregenerating the spawn area.
const PREGENERATION_FRAME_LIMIT: usize = 1_000_000;

/// Opens a world and pregenerates the area around its centre.
///
/// Usage: `voxel-world [world name] [seed]`. A missing seed picks a random one; an
/// existing world keeps the seed it was created with.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let mut args = std::env::args().skip(1);
    let name = args.next().unwrap_or_else(|| "world".to_string());
    let seed = match args.next().map(|seed| seed.parse::<i32>()) {
        Some(Ok(seed)) => seed,
        Some(Err(err)) => {
            error!("Invalid seed: {err}");
            return;
        }
        None => fastrand::i32(..),
    };

    let settings = match WorldSettings::load(SETTINGS_FILE) {
        Ok(settings) => settings,
        Err(err) => {
            error!("{err}");
            return;
        }
    };

    let mut engine_state = match EngineState::new(settings, &name, seed) {
        Ok(engine_state) => engine_state,
        Err(err) => {
            error!("Could not open world \"{name}\": {err}");
            return;
        }
    };

    let center = engine_state.world().dimensions().world_center() as f32;
    let viewer = Point3::new(center, 0.0, center);
    let start = web_time::Instant::now();
    let update = engine_state.run_until_idle(viewer, PREGENERATION_FRAME_LIMIT);
    info!(
        "Pregenerated {} chunk mesh(es) in {:?}: {:?}",
        update.meshes.len(),
        start.elapsed(),
        engine_state.stats()
    );

    let report = engine_state.shutdown();
    if !report.is_complete() {
        error!("{} chunk(s) could not be saved", report.failed.len());
    }
}
