//! # Voxel Terrain
//!
//! Procedural, chunked voxel terrain streamed around a moving player.
//!
//! The crate generates chunk data from layered noise on a background worker,
//! stores it, hands it to a mesh consumer, streams chunks in and out of a
//! square window around the player, and applies single-block edits.
//!
//! ## Key Modules
//!
//! * `config` - Load-time terrain configuration
//! * `error` - Error types
//! * `terrain_state` - Generation, storage, streaming and edits
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut terrain = TerrainState::new(config, mesher, spawner)?;
//!
//! // Once per frame:
//! let report = terrain.on_tick(player_position);
//! ```
//!
//! The binary runs a headless walk through the world with a face-counting
//! mesher in place of a renderer:
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- terrain.json
//! ```

use std::time::Duration;

use cgmath::Point3;
use log::info;

pub mod config;
pub mod error;
pub mod terrain_state;

use config::TerrainConfig;
use error::TerrainError;
use terrain_state::meshing::face_count_mesher::FaceCountMesher;
use terrain_state::spawner::LoggingSpawner;
use terrain_state::TerrainState;

/// Ticks simulated by [`run`].
const SIMULATED_TICKS: u32 = 600;
/// Player speed along +X, in blocks per tick.
const WALK_SPEED: f32 = 0.5;
const TICK_DURATION: Duration = Duration::from_millis(16);
const STATS_INTERVAL: u32 = 60;

/// Initializes `env_logger` on stdout, filtered by `RUST_LOG`.
pub fn init_logging() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
}

/// Walks a simulated player through the world and logs what streams in.
///
/// The first command line argument, if any, is a JSON config file.
pub fn run() -> Result<(), TerrainError> {
    init_logging();
    info!("Logger initialized");

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading config from {}", path);
            TerrainConfig::from_file(path)?
        }
        None => TerrainConfig::default(),
    };
    let spawn_height = config.chunk_height as f32 * 0.5;

    let mesher = FaceCountMesher::new(1).map_err(TerrainError::WorkerSpawn)?;
    let mut terrain = TerrainState::new(config, mesher, LoggingSpawner)?;

    for tick in 0..SIMULATED_TICKS {
        let player = Point3::new(tick as f32 * WALK_SPEED, spawn_height, 0.0);
        let report = terrain.on_tick(player);
        if !report.evicted.is_empty() {
            info!("Tick {}: evicted {:?}", tick, report.evicted);
        }

        if tick % STATS_INTERVAL == 0 {
            let totals = terrain.mesh_consumer().total();
            info!(
                "Tick {}: {:?}, {} visible faces",
                tick,
                terrain.stats(),
                totals.visible_faces
            );
        }
        std::thread::sleep(TICK_DURATION);
    }

    info!("Finished: {:?}", terrain.stats());
    Ok(())
}
