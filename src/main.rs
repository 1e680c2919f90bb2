//! # Voxel Terrain Entry Point
//!
//! Calls into the library's `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- [config.json]
//! ```

fn main() {
    if let Err(error) = voxel_terrain::run() {
        log::error!("{error}");
        std::process::exit(1);
    }
}
