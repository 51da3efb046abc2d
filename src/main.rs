//! # Voxel World Entry Point
//!
//! Calls into the library's `run()` function, which opens a world and pregenerates
//! the area around its centre.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- my-world 1337
//! ```

fn main() {
    voxel_world::run();
}
