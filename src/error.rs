//! # Error Types
//!
//! Errors surfaced by configuration loading, chunk generation and world edits.
//! Generation errors never reach the player-visible layer; they are handed to
//! the completion callback of the failed request and logged.

use std::path::PathBuf;

use cgmath::Point3;

use crate::terrain_state::voxels::coordinates::ChunkCoordinate;

/// Errors raised while loading or validating a [`TerrainConfig`](crate::config::TerrainConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config content was not valid JSON for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A chunk dimension was zero.
    #[error("chunk dimensions must be positive, got {width}x{height}x{depth}")]
    InvalidChunkDimensions {
        width: usize,
        height: usize,
        depth: usize,
    },

    /// The height map extent was zero along one axis.
    #[error("height map size must be positive, got {width}x{depth}")]
    InvalidMapSize { width: usize, depth: usize },

    /// Height curve keys were not in ascending time order.
    #[error("height curve keys must be sorted by time (key {index} is out of order)")]
    InvalidHeightCurve { index: usize },
}

/// Reasons a chunk generation request finished without committing data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    /// The fill task panicked on the worker thread.
    #[error("generation of chunk {coordinate:?} panicked: {message}")]
    WorkerPanicked {
        coordinate: ChunkCoordinate,
        message: String,
    },

    /// The generation worker is gone and can no longer accept work.
    #[error("generation worker disconnected while chunk {coordinate:?} was pending")]
    WorkerDisconnected { coordinate: ChunkCoordinate },
}

/// Reasons a [`set_block`](crate::terrain_state::TerrainState::set_block) call was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// The owning chunk has no committed voxel data yet.
    #[error("chunk {coordinate:?} has not been generated")]
    ChunkNotGenerated { coordinate: ChunkCoordinate },

    /// The position lies outside the world's vertical extent.
    #[error("block position {position:?} is outside the chunk height")]
    OutOfBounds { position: Point3<i32> },
}

/// Errors raised while building a [`TerrainState`](crate::terrain_state::TerrainState).
#[derive(Debug, thiserror::Error)]
pub enum TerrainError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A background worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}
