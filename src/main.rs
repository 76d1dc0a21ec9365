//! # Voxel World Entry Point
//!
//! This is the main entry point for the headless engine binary.
//! It simply calls into the library's `run()` function, which reads `config.json`
//! (if present), builds the world, meshes it and saves it.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --release
//! ```

fn main() {
    voxel_world::run();
}
